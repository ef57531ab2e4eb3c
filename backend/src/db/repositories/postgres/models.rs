use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{comments, posts};
use crate::api::{Comment, CommentId, NewComment, NewPost, Post, PostChanges, PostId};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PostRow {
    pub id: i64,
    pub title: String,
    pub contents: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = posts)]
pub struct NewPostRow {
    pub title: String,
    pub contents: String,
}

/// `None` fields are left out of the generated `SET` clause.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = posts)]
pub struct PostChangesetRow {
    pub title: Option<String>,
    pub contents: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CommentRow {
    pub id: i64,
    pub text: String,
    pub post_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
pub struct NewCommentRow {
    pub text: String,
    pub post_id: i64,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: PostId(row.id),
            title: row.title,
            contents: row.contents,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: CommentId(row.id),
            text: row.text,
            post_id: PostId(row.post_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<&NewPost> for NewPostRow {
    fn from(post: &NewPost) -> Self {
        NewPostRow {
            title: post.title.clone(),
            contents: post.contents.clone(),
        }
    }
}

impl From<&NewComment> for NewCommentRow {
    fn from(comment: &NewComment) -> Self {
        NewCommentRow {
            text: comment.text.clone(),
            post_id: comment.post_id.value(),
        }
    }
}

impl PostChangesetRow {
    pub fn new(changes: &PostChanges, updated_at: DateTime<Utc>) -> Self {
        PostChangesetRow {
            title: changes.title.clone(),
            contents: changes.contents.clone(),
            updated_at,
        }
    }
}
