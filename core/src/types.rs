//! Records and request payloads for the deck API.
//!
//! # Design
//! Records are immutable snapshots of server state. They are only ever built
//! by the structuring engine from a normalized response, so each one spells
//! out its fields and defaults in a `Structure` impl instead of deriving
//! `Deserialize`. Serializing a record yields the normalized (underscore) form
//! again, which is what the structuring engine consumes.
//!
//! Payload types are the other direction: they serialize to the wire's
//! camelCase request bodies and are never structured.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StructureError;
use crate::structure::{parse_datetime, Converter, Fields, Structure};

/// A participant known to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub primary_key: String,
    pub uid: String,
    pub displayname: String,
}

impl Structure for User {
    const TARGET: &'static str = "User";

    fn structure(value: &Value, converter: &Converter) -> Result<Self, StructureError> {
        let f = Fields::new(Self::TARGET, value, converter)?;
        Ok(Self {
            primary_key: f.required("primary_key")?,
            uid: f.required("uid")?,
            displayname: f.required("displayname")?,
        })
    }
}

/// A board-scoped tag. Every field is optional because the server sends
/// labels in two shapes: as a standalone resource and embedded in a card.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Label {
    pub id: Option<i64>,
    pub card_id: Option<i64>,
    pub board_id: Option<i64>,
    pub color: Option<String>,
    pub title: Option<String>,
}

impl Structure for Label {
    const TARGET: &'static str = "Label";

    fn structure(value: &Value, converter: &Converter) -> Result<Self, StructureError> {
        let f = Fields::new(Self::TARGET, value, converter)?;
        Ok(Self {
            id: f.or_default("id")?,
            card_id: f.or_default("card_id")?,
            board_id: f.or_default("board_id")?,
            color: f.or_default("color")?,
            title: f.or_default("title")?,
        })
    }
}

/// An access rule granting a participant permissions on a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AclEntry {
    pub id: i64,
    pub participant: User,
    /// 0 user, 1 group, 7 circle.
    #[serde(rename = "type")]
    pub participant_type: i64,
    pub board_id: Option<i64>,
    pub permission_edit: bool,
    pub permission_share: bool,
    pub permission_manage: bool,
    pub owner: bool,
}

impl Structure for AclEntry {
    const TARGET: &'static str = "AclEntry";

    fn structure(value: &Value, converter: &Converter) -> Result<Self, StructureError> {
        let f = Fields::new(Self::TARGET, value, converter)?;
        Ok(Self {
            id: f.required("id")?,
            participant: f.required("participant")?,
            participant_type: f.or_default("type")?,
            board_id: f.or_default("board_id")?,
            permission_edit: f.or_default("permission_edit")?,
            permission_share: f.or_default("permission_share")?,
            permission_manage: f.or_default("permission_manage")?,
            owner: f.or_default("owner")?,
        })
    }
}

/// A task within a stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub id: i64,
    pub title: String,
    pub stack_id: i64,
    pub last_modified: i64,
    pub created_at: i64,
    pub owner: String,
    pub order: i64,
    pub archived: bool,
    pub notified: bool,
    pub deleted_at: i64,
    pub duedate: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub card_type: String,
    pub labels: Vec<Label>,
}

impl Card {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at > 0
    }

    /// The due date parsed leniently, or `None` when the card has none.
    pub fn due_date(&self) -> Result<Option<DateTime<Utc>>, StructureError> {
        self.duedate.as_deref().map(parse_datetime).transpose()
    }

    pub fn has_label(&self, label_id: i64) -> bool {
        self.labels.iter().any(|label| label.id == Some(label_id))
    }
}

impl Structure for Card {
    const TARGET: &'static str = "Card";

    fn structure(value: &Value, converter: &Converter) -> Result<Self, StructureError> {
        let f = Fields::new(Self::TARGET, value, converter)?;
        Ok(Self {
            id: f.required("id")?,
            title: f.required("title")?,
            stack_id: f.required("stack_id")?,
            last_modified: f.required("last_modified")?,
            created_at: f.required("created_at")?,
            owner: f.required("owner")?,
            order: f.required("order")?,
            archived: f.required("archived")?,
            notified: f.or_default("notified")?,
            deleted_at: f.or_default("deleted_at")?,
            duedate: f.or_default("duedate")?,
            description: f.or_default("description")?,
            card_type: f.or_else("type", || "plain".to_string())?,
            labels: f.or_default("labels")?,
        })
    }
}

/// A column within a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stack {
    pub id: i64,
    pub title: String,
    pub board_id: i64,
    pub order: i64,
    pub deleted_at: i64,
    pub cards: Vec<Card>,
}

impl Stack {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at > 0
    }
}

impl Structure for Stack {
    const TARGET: &'static str = "Stack";

    fn structure(value: &Value, converter: &Converter) -> Result<Self, StructureError> {
        let f = Fields::new(Self::TARGET, value, converter)?;
        Ok(Self {
            id: f.required("id")?,
            title: f.required("title")?,
            board_id: f.required("board_id")?,
            order: f.required("order")?,
            deleted_at: f.or_default("deleted_at")?,
            cards: f.or_default("cards")?,
        })
    }
}

/// Top-level kanban container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    pub id: i64,
    pub title: String,
    pub owner: String,
    pub color: String,
    pub archived: bool,
    pub deleted_at: i64,
    pub last_modified: i64,
    pub users: Vec<User>,
    pub acl: Vec<AclEntry>,
    pub labels: Vec<Label>,
    pub permissions: BTreeMap<String, bool>,
}

impl Board {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at > 0
    }

    pub fn label(&self, label_id: i64) -> Option<&Label> {
        self.labels.iter().find(|label| label.id == Some(label_id))
    }
}

impl Structure for Board {
    const TARGET: &'static str = "Board";

    fn structure(value: &Value, converter: &Converter) -> Result<Self, StructureError> {
        let f = Fields::new(Self::TARGET, value, converter)?;
        Ok(Self {
            id: f.required("id")?,
            title: f.required("title")?,
            owner: f.required("owner")?,
            color: f.required("color")?,
            archived: f.required("archived")?,
            deleted_at: f.or_default("deleted_at")?,
            last_modified: f.or_default("last_modified")?,
            users: f.or_default("users")?,
            acl: f.or_default("acl")?,
            labels: f.or_default("labels")?,
            permissions: f.or_default("permissions")?,
        })
    }
}

pub const DEFAULT_COLOR: &str = "ff0000";
pub const DEFAULT_ORDER: i64 = 999;
pub const DEFAULT_CARD_TYPE: &str = "plain";

/// Request payload for creating a board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardInput {
    pub title: String,
    pub color: String,
}

impl BoardInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            color: DEFAULT_COLOR.to_string(),
        }
    }
}

/// Request payload for updating a board. All fields are sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardUpdate {
    pub title: String,
    pub color: String,
    pub archived: bool,
}

/// Request payload for adding an ACL rule to a board.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AclRuleInput {
    #[serde(rename = "type")]
    pub participant_type: i64,
    pub participant: String,
    pub permission_edit: bool,
    pub permission_share: bool,
    pub permission_manage: bool,
}

/// Request payload for changing the permissions of an existing ACL rule.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AclPermissions {
    pub permission_edit: bool,
    pub permission_share: bool,
    pub permission_manage: bool,
}

/// Request payload for creating or updating a stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackInput {
    pub title: String,
    pub order: i64,
}

impl StackInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            order: DEFAULT_ORDER,
        }
    }
}

/// Request payload for creating a card. `description` and `duedate` are sent
/// as `null` when unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardInput {
    pub title: String,
    #[serde(rename = "type")]
    pub card_type: String,
    pub order: i64,
    pub description: Option<String>,
    pub duedate: Option<String>,
}

impl CardInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            card_type: DEFAULT_CARD_TYPE.to_string(),
            order: DEFAULT_ORDER,
            description: None,
            duedate: None,
        }
    }
}

/// Request payload for updating a card. The server replaces every field
/// except `archived`, which is left alone when unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardUpdate {
    pub owner: String,
    pub title: String,
    #[serde(rename = "type")]
    pub card_type: String,
    pub order: i64,
    pub description: String,
    pub duedate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl CardUpdate {
    pub fn new(owner: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            title: title.into(),
            card_type: DEFAULT_CARD_TYPE.to_string(),
            order: DEFAULT_ORDER,
            description: String::new(),
            duedate: None,
            archived: None,
        }
    }
}

/// Request payload for creating or updating a label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelInput {
    pub title: String,
    pub color: String,
}

impl LabelInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            color: DEFAULT_COLOR.to_string(),
        }
    }
}
