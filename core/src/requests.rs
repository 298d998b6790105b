//! Stateless request builders for every deck API operation.
//!
//! # Design
//! `DeckRequests` holds only the base URL. Each `build_*` method produces an
//! `HttpRequest` without touching the network, so paths and payloads can be
//! checked in isolation. Paths are relative to the boards endpoint; a few
//! board-level operations live under an extra `/boards` segment on the server
//! and are built that way here.

use serde::Serialize;
use serde_json::json;

use crate::error::DeckError;
use crate::http::{HttpMethod, HttpRequest};
use crate::types::{
    AclPermissions, AclRuleInput, BoardInput, BoardUpdate, CardInput, CardUpdate, LabelInput,
    StackInput,
};

/// Card sub-resource actions, all sent as `PUT .../cards/{id}/{action}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    AssignLabel,
    RemoveLabel,
    AssignUser,
    UnassignUser,
    Reorder,
}

impl CardAction {
    pub fn as_str(self) -> &'static str {
        match self {
            CardAction::AssignLabel => "assignLabel",
            CardAction::RemoveLabel => "removeLabel",
            CardAction::AssignUser => "assignUser",
            CardAction::UnassignUser => "unassignUser",
            CardAction::Reorder => "reorder",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeckRequests {
    base_url: String,
}

impl DeckRequests {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn bare(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    fn with_body<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<HttpRequest, DeckError> {
        let body =
            serde_json::to_string(body).map_err(|e| DeckError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            body: Some(body),
            ..self.bare(method, path)
        })
    }

    // Boards

    pub fn build_list_boards(&self) -> HttpRequest {
        self.bare(HttpMethod::Get, "")
    }

    pub fn build_get_board(&self, board_id: i64) -> HttpRequest {
        self.bare(HttpMethod::Get, &format!("/{board_id}"))
    }

    pub fn build_create_board(&self, input: &BoardInput) -> Result<HttpRequest, DeckError> {
        self.with_body(HttpMethod::Post, "", input)
    }

    pub fn build_update_board(
        &self,
        board_id: i64,
        input: &BoardUpdate,
    ) -> Result<HttpRequest, DeckError> {
        self.with_body(HttpMethod::Put, &format!("/boards/{board_id}"), input)
    }

    pub fn build_delete_board(&self, board_id: i64) -> HttpRequest {
        self.bare(HttpMethod::Delete, &format!("/{board_id}"))
    }

    pub fn build_undo_delete_board(&self, board_id: i64) -> HttpRequest {
        self.bare(HttpMethod::Post, &format!("/boards/{board_id}/undo_delete"))
    }

    pub fn build_add_acl_rule(
        &self,
        board_id: i64,
        input: &AclRuleInput,
    ) -> Result<HttpRequest, DeckError> {
        self.with_body(HttpMethod::Post, &format!("/boards/{board_id}/acl"), input)
    }

    pub fn build_update_acl_rule(
        &self,
        board_id: i64,
        acl_id: i64,
        permissions: &AclPermissions,
    ) -> Result<HttpRequest, DeckError> {
        self.with_body(
            HttpMethod::Put,
            &format!("/boards/{board_id}/acl/{acl_id}"),
            permissions,
        )
    }

    pub fn build_delete_acl_rule(&self, board_id: i64, acl_id: i64) -> HttpRequest {
        self.bare(HttpMethod::Delete, &format!("/boards/{board_id}/acl/{acl_id}"))
    }

    // Stacks

    pub fn build_list_stacks(&self, board_id: i64) -> HttpRequest {
        self.bare(HttpMethod::Get, &format!("/{board_id}/stacks"))
    }

    pub fn build_list_archived_stacks(&self, board_id: i64) -> HttpRequest {
        self.bare(HttpMethod::Get, &format!("/{board_id}/stacks/archived"))
    }

    pub fn build_get_stack(&self, board_id: i64, stack_id: i64) -> HttpRequest {
        self.bare(HttpMethod::Get, &format!("/{board_id}/stacks/{stack_id}"))
    }

    pub fn build_create_stack(
        &self,
        board_id: i64,
        input: &StackInput,
    ) -> Result<HttpRequest, DeckError> {
        self.with_body(HttpMethod::Post, &format!("/{board_id}/stacks"), input)
    }

    pub fn build_update_stack(
        &self,
        board_id: i64,
        stack_id: i64,
        input: &StackInput,
    ) -> Result<HttpRequest, DeckError> {
        self.with_body(
            HttpMethod::Put,
            &format!("/{board_id}/stacks/{stack_id}"),
            input,
        )
    }

    pub fn build_delete_stack(&self, board_id: i64, stack_id: i64) -> HttpRequest {
        self.bare(HttpMethod::Delete, &format!("/{board_id}/stacks/{stack_id}"))
    }

    // Cards

    fn card_path(board_id: i64, stack_id: i64, card_id: i64) -> String {
        format!("/{board_id}/stacks/{stack_id}/cards/{card_id}")
    }

    pub fn build_get_card(&self, board_id: i64, stack_id: i64, card_id: i64) -> HttpRequest {
        self.bare(HttpMethod::Get, &Self::card_path(board_id, stack_id, card_id))
    }

    pub fn build_create_card(
        &self,
        board_id: i64,
        stack_id: i64,
        input: &CardInput,
    ) -> Result<HttpRequest, DeckError> {
        self.with_body(
            HttpMethod::Post,
            &format!("/{board_id}/stacks/{stack_id}/cards"),
            input,
        )
    }

    pub fn build_update_card(
        &self,
        board_id: i64,
        stack_id: i64,
        card_id: i64,
        input: &CardUpdate,
    ) -> Result<HttpRequest, DeckError> {
        self.with_body(
            HttpMethod::Put,
            &Self::card_path(board_id, stack_id, card_id),
            input,
        )
    }

    pub fn build_delete_card(&self, board_id: i64, stack_id: i64, card_id: i64) -> HttpRequest {
        self.bare(HttpMethod::Delete, &Self::card_path(board_id, stack_id, card_id))
    }

    /// `PUT .../cards/{card_id}/{action}` with the action's JSON body.
    pub fn build_card_action(
        &self,
        board_id: i64,
        stack_id: i64,
        card_id: i64,
        action: CardAction,
        body: &serde_json::Value,
    ) -> Result<HttpRequest, DeckError> {
        let path = format!(
            "{}/{}",
            Self::card_path(board_id, stack_id, card_id),
            action.as_str()
        );
        self.with_body(HttpMethod::Put, &path, body)
    }

    pub fn build_assign_label(
        &self,
        board_id: i64,
        stack_id: i64,
        card_id: i64,
        label_id: i64,
    ) -> Result<HttpRequest, DeckError> {
        let body = json!({ "labelId": label_id });
        self.build_card_action(board_id, stack_id, card_id, CardAction::AssignLabel, &body)
    }

    pub fn build_remove_label(
        &self,
        board_id: i64,
        stack_id: i64,
        card_id: i64,
        label_id: i64,
    ) -> Result<HttpRequest, DeckError> {
        let body = json!({ "labelId": label_id });
        self.build_card_action(board_id, stack_id, card_id, CardAction::RemoveLabel, &body)
    }

    pub fn build_assign_user(
        &self,
        board_id: i64,
        stack_id: i64,
        card_id: i64,
        user_id: &str,
    ) -> Result<HttpRequest, DeckError> {
        let body = json!({ "userId": user_id });
        self.build_card_action(board_id, stack_id, card_id, CardAction::AssignUser, &body)
    }

    pub fn build_unassign_user(
        &self,
        board_id: i64,
        stack_id: i64,
        card_id: i64,
        user_id: &str,
    ) -> Result<HttpRequest, DeckError> {
        let body = json!({ "userId": user_id });
        self.build_card_action(board_id, stack_id, card_id, CardAction::UnassignUser, &body)
    }

    /// Move a card to position `order` in `target_stack_id`.
    pub fn build_reorder_card(
        &self,
        board_id: i64,
        stack_id: i64,
        card_id: i64,
        order: i64,
        target_stack_id: i64,
    ) -> Result<HttpRequest, DeckError> {
        let body = json!({ "order": order, "stackId": target_stack_id });
        self.build_card_action(board_id, stack_id, card_id, CardAction::Reorder, &body)
    }

    // Labels

    pub fn build_get_label(&self, board_id: i64, label_id: i64) -> HttpRequest {
        self.bare(HttpMethod::Get, &format!("/{board_id}/labels/{label_id}"))
    }

    pub fn build_create_label(
        &self,
        board_id: i64,
        input: &LabelInput,
    ) -> Result<HttpRequest, DeckError> {
        self.with_body(HttpMethod::Post, &format!("/{board_id}/labels"), input)
    }

    pub fn build_update_label(
        &self,
        board_id: i64,
        label_id: i64,
        input: &LabelInput,
    ) -> Result<HttpRequest, DeckError> {
        self.with_body(
            HttpMethod::Put,
            &format!("/{board_id}/labels/{label_id}"),
            input,
        )
    }

    pub fn build_delete_label(&self, board_id: i64, label_id: i64) -> HttpRequest {
        self.bare(HttpMethod::Delete, &format!("/{board_id}/labels/{label_id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    const BASE: &str = "https://cloud.example.com/index.php/apps/deck/api/v1.0/boards";

    fn requests() -> DeckRequests {
        DeckRequests::new(BASE)
    }

    fn body(req: &HttpRequest) -> Value {
        serde_json::from_str(req.body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn list_boards_hits_the_base_path() {
        let req = requests().build_list_boards();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, BASE);
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let req = DeckRequests::new(&format!("{BASE}/")).build_get_board(7);
        assert_eq!(req.path, format!("{BASE}/7"));
    }

    #[test]
    fn create_board_sends_title_and_color() {
        let req = requests().build_create_board(&BoardInput::new("test board")).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, BASE);
        assert_eq!(body(&req), serde_json::json!({"title": "test board", "color": "ff0000"}));
    }

    #[test]
    fn board_level_operations_use_the_boards_segment() {
        let update = BoardUpdate {
            title: "t".into(),
            color: "00ff00".into(),
            archived: true,
        };
        let req = requests().build_update_board(3, &update).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, format!("{BASE}/boards/3"));
        assert_eq!(body(&req)["archived"], true);

        let req = requests().build_undo_delete_board(3);
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, format!("{BASE}/boards/3/undo_delete"));

        let req = requests().build_delete_board(3);
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, format!("{BASE}/3"));
    }

    #[test]
    fn acl_requests() {
        let rule = AclRuleInput {
            participant_type: 0,
            participant: "alice".into(),
            permission_edit: true,
            permission_share: true,
            permission_manage: false,
        };
        let req = requests().build_add_acl_rule(2, &rule).unwrap();
        assert_eq!(req.path, format!("{BASE}/boards/2/acl"));
        assert_eq!(body(&req)["permissionShare"], true);

        let perms = AclPermissions {
            permission_manage: true,
            ..AclPermissions::default()
        };
        let req = requests().build_update_acl_rule(2, 9, &perms).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, format!("{BASE}/boards/2/acl/9"));
        assert_eq!(
            body(&req),
            serde_json::json!({"permissionEdit": false, "permissionShare": false, "permissionManage": true})
        );

        let req = requests().build_delete_acl_rule(2, 9);
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, format!("{BASE}/boards/2/acl/9"));
    }

    #[test]
    fn stack_paths() {
        let r = requests();
        assert_eq!(r.build_list_stacks(1).path, format!("{BASE}/1/stacks"));
        assert_eq!(r.build_list_archived_stacks(1).path, format!("{BASE}/1/stacks/archived"));
        assert_eq!(r.build_get_stack(1, 4).path, format!("{BASE}/1/stacks/4"));
        assert_eq!(r.build_delete_stack(1, 4).method, HttpMethod::Delete);

        let req = r.build_create_stack(1, &StackInput::new("To do")).unwrap();
        assert_eq!(body(&req), serde_json::json!({"title": "To do", "order": 999}));

        let req = r
            .build_update_stack(1, 4, &StackInput { title: "Done".into(), order: 2 })
            .unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, format!("{BASE}/1/stacks/4"));
    }

    #[test]
    fn card_requests() {
        let r = requests();
        let req = r.build_create_card(1, 4, &CardInput::new("card")).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, format!("{BASE}/1/stacks/4/cards"));
        assert_eq!(body(&req)["type"], "plain");
        assert!(body(&req)["duedate"].is_null());

        let update = CardUpdate {
            description: "desc".into(),
            ..CardUpdate::new("admin", "New Title")
        };
        let req = r.build_update_card(1, 4, 8, &update).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, format!("{BASE}/1/stacks/4/cards/8"));
        assert_eq!(body(&req)["owner"], "admin");
        assert_eq!(body(&req)["description"], "desc");

        assert_eq!(r.build_get_card(1, 4, 8).method, HttpMethod::Get);
        assert_eq!(r.build_delete_card(1, 4, 8).method, HttpMethod::Delete);
    }

    #[test]
    fn card_actions_put_to_action_subpaths() {
        let r = requests();
        let req = r.build_assign_label(1, 4, 8, 3).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, format!("{BASE}/1/stacks/4/cards/8/assignLabel"));
        assert_eq!(body(&req), serde_json::json!({"labelId": 3}));

        let req = r.build_remove_label(1, 4, 8, 3).unwrap();
        assert_eq!(req.path, format!("{BASE}/1/stacks/4/cards/8/removeLabel"));

        let req = r.build_assign_user(1, 4, 8, "alice").unwrap();
        assert_eq!(req.path, format!("{BASE}/1/stacks/4/cards/8/assignUser"));
        assert_eq!(body(&req), serde_json::json!({"userId": "alice"}));

        let req = r.build_unassign_user(1, 4, 8, "alice").unwrap();
        assert_eq!(req.path, format!("{BASE}/1/stacks/4/cards/8/unassignUser"));

        let req = r.build_reorder_card(1, 4, 8, 0, 5).unwrap();
        assert_eq!(req.path, format!("{BASE}/1/stacks/4/cards/8/reorder"));
        assert_eq!(body(&req), serde_json::json!({"order": 0, "stackId": 5}));
    }

    #[test]
    fn label_requests() {
        let r = requests();
        assert_eq!(r.build_get_label(1, 2).path, format!("{BASE}/1/labels/2"));
        let req = r.build_create_label(1, &LabelInput::new("Urgent")).unwrap();
        assert_eq!(req.path, format!("{BASE}/1/labels"));
        assert_eq!(body(&req), serde_json::json!({"title": "Urgent", "color": "ff0000"}));
        let req = r
            .build_update_label(1, 2, &LabelInput { title: "x".into(), color: "000000".into() })
            .unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(r.build_delete_label(1, 2).method, HttpMethod::Delete);
    }
}
