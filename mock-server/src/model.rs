//! Wire types, serialized with the same camelCase keys the real service uses.
//!
//! Defined independently of `deck-core`'s records so the client's
//! normalization and structuring are exercised against a genuine camelCase
//! payload. Integration tests catch drift between the two.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub primary_key: String,
    pub uid: String,
    pub displayname: String,
}

impl User {
    pub fn named(uid: &str) -> Self {
        Self {
            primary_key: uid.to_string(),
            uid: uid.to_string(),
            displayname: uid.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: i64,
    pub title: String,
    pub color: String,
    pub board_id: i64,
    pub card_id: Option<i64>,
    pub last_modified: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Acl {
    pub id: i64,
    pub participant: User,
    #[serde(rename = "type")]
    pub participant_type: i64,
    pub board_id: i64,
    pub permission_edit: bool,
    pub permission_share: bool,
    pub permission_manage: bool,
    pub owner: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: i64,
    pub participant: User,
    pub card_id: i64,
    #[serde(rename = "type")]
    pub participant_type: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: i64,
    pub title: String,
    pub stack_id: i64,
    #[serde(rename = "type")]
    pub card_type: String,
    pub last_modified: i64,
    pub created_at: i64,
    pub labels: Vec<Label>,
    pub assigned_users: Vec<Assignment>,
    pub owner: String,
    pub order: i64,
    pub archived: bool,
    pub notified: bool,
    pub deleted_at: i64,
    pub duedate: Option<String>,
    pub description: Option<String>,
}

/// `cards` is omitted entirely when the stack has none, as the real service
/// does.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stack {
    pub id: i64,
    pub title: String,
    pub board_id: i64,
    pub order: i64,
    pub deleted_at: i64,
    pub last_modified: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<Card>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: i64,
    pub title: String,
    pub owner: String,
    pub color: String,
    pub archived: bool,
    pub labels: Vec<Label>,
    pub acl: Vec<Acl>,
    pub permissions: BTreeMap<String, bool>,
    pub users: Vec<User>,
    pub deleted_at: i64,
    pub last_modified: i64,
}

// Request bodies.

#[derive(Debug, Deserialize)]
pub struct BoardInput {
    pub title: String,
    pub color: String,
}

#[derive(Debug, Deserialize)]
pub struct BoardUpdate {
    pub title: String,
    pub color: String,
    pub archived: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AclInput {
    #[serde(rename = "type")]
    pub participant_type: i64,
    pub participant: String,
    #[serde(default)]
    pub permission_edit: bool,
    #[serde(default)]
    pub permission_share: bool,
    #[serde(default)]
    pub permission_manage: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AclUpdate {
    pub permission_edit: bool,
    pub permission_share: bool,
    pub permission_manage: bool,
}

#[derive(Debug, Deserialize)]
pub struct StackInput {
    pub title: String,
    pub order: i64,
}

#[derive(Debug, Deserialize)]
pub struct CardInput {
    pub title: String,
    #[serde(rename = "type", default = "plain")]
    pub card_type: String,
    #[serde(default = "last_order")]
    pub order: i64,
    pub description: Option<String>,
    pub duedate: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CardUpdate {
    pub owner: String,
    pub title: String,
    #[serde(rename = "type", default = "plain")]
    pub card_type: String,
    #[serde(default = "last_order")]
    pub order: i64,
    pub description: Option<String>,
    pub duedate: Option<String>,
    /// Left unchanged when absent.
    #[serde(default)]
    pub archived: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct LabelInput {
    pub title: String,
    pub color: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelRef {
    pub label_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reorder {
    pub order: i64,
    pub stack_id: i64,
}

fn plain() -> String {
    "plain".to_string()
}

fn last_order() -> i64 {
    999
}
