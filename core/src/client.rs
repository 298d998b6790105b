//! Blocking client for the deck API.
//!
//! # Design
//! `DeckClient` combines three stateless pieces: `DeckRequests` builds the
//! request, `Session` sends it and checks the status, and the pipeline turns
//! the decoded body into records. Raw operations return the decoded JSON as
//! is; typed operations wrap the raw call in `pipeline::deserialized` with
//! the target type as their only per-endpoint declaration. Nothing is cached
//! or retried, and each call is an independent round trip.

use serde_json::Value;
use tracing::info;

use crate::config::DeckConfig;
use crate::error::DeckError;
use crate::http::HttpRequest;
use crate::pipeline::deserialized;
use crate::requests::DeckRequests;
use crate::session::Session;
use crate::structure::{Converter, Structure};
use crate::transport::{Transport, UreqTransport};
use crate::types::{
    AclPermissions, AclRuleInput, Board, BoardInput, BoardUpdate, Card, CardInput, CardUpdate,
    Label, LabelInput, Stack, StackInput,
};

#[derive(Debug)]
pub struct DeckClient<T = UreqTransport> {
    requests: DeckRequests,
    session: Session<T>,
    converter: Converter,
}

impl DeckClient<UreqTransport> {
    /// Client over a blocking HTTPS transport configured from `config`.
    pub fn new(config: &DeckConfig) -> Self {
        Self::with_transport(config, UreqTransport::new(config.ssl_verify))
    }
}

impl<T: Transport> DeckClient<T> {
    pub fn with_transport(config: &DeckConfig, transport: T) -> Self {
        Self {
            requests: DeckRequests::new(&config.base_url()),
            session: Session::new(config, transport),
            converter: Converter::new(),
        }
    }

    pub fn requests(&self) -> &DeckRequests {
        &self.requests
    }

    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    /// Register extra conversion hooks used by every typed operation.
    pub fn converter_mut(&mut self) -> &mut Converter {
        &mut self.converter
    }

    fn raw(&self, request: HttpRequest) -> Result<Value, DeckError> {
        self.session.send_json(request)
    }

    fn typed<R: Structure>(&self, request: HttpRequest) -> Result<R, DeckError> {
        deserialized(&self.converter, || self.raw(request))
    }

    // Boards

    pub fn get_boards(&self) -> Result<Vec<Board>, DeckError> {
        self.typed(self.requests.build_list_boards())
    }

    pub fn get_board(&self, board_id: i64) -> Result<Board, DeckError> {
        self.typed(self.requests.build_get_board(board_id))
    }

    pub fn create_board(&self, input: &BoardInput) -> Result<Board, DeckError> {
        info!(title = %input.title, color = %input.color, "creating board");
        self.typed(self.requests.build_create_board(input)?)
    }

    pub fn update_board(&self, board_id: i64, input: &BoardUpdate) -> Result<Value, DeckError> {
        self.raw(self.requests.build_update_board(board_id, input)?)
    }

    pub fn delete_board(&self, board_id: i64) -> Result<Value, DeckError> {
        info!(board_id, "deleting board");
        self.raw(self.requests.build_delete_board(board_id))
    }

    pub fn undo_delete_board(&self, board_id: i64) -> Result<Value, DeckError> {
        self.raw(self.requests.build_undo_delete_board(board_id))
    }

    pub fn add_board_acl_rule(
        &self,
        board_id: i64,
        rule: &AclRuleInput,
    ) -> Result<Value, DeckError> {
        self.raw(self.requests.build_add_acl_rule(board_id, rule)?)
    }

    pub fn update_board_acl_rule(
        &self,
        board_id: i64,
        acl_id: i64,
        permissions: &AclPermissions,
    ) -> Result<Value, DeckError> {
        self.raw(
            self.requests
                .build_update_acl_rule(board_id, acl_id, permissions)?,
        )
    }

    pub fn delete_board_acl_rule(&self, board_id: i64, acl_id: i64) -> Result<Value, DeckError> {
        self.raw(self.requests.build_delete_acl_rule(board_id, acl_id))
    }

    // Stacks

    pub fn get_stacks(&self, board_id: i64) -> Result<Vec<Stack>, DeckError> {
        self.typed(self.requests.build_list_stacks(board_id))
    }

    pub fn get_archived_stacks(&self, board_id: i64) -> Result<Vec<Stack>, DeckError> {
        self.typed(self.requests.build_list_archived_stacks(board_id))
    }

    pub fn get_stack(&self, board_id: i64, stack_id: i64) -> Result<Stack, DeckError> {
        self.typed(self.requests.build_get_stack(board_id, stack_id))
    }

    pub fn create_stack(&self, board_id: i64, input: &StackInput) -> Result<Stack, DeckError> {
        self.typed(self.requests.build_create_stack(board_id, input)?)
    }

    pub fn update_stack(
        &self,
        board_id: i64,
        stack_id: i64,
        input: &StackInput,
    ) -> Result<Value, DeckError> {
        self.raw(self.requests.build_update_stack(board_id, stack_id, input)?)
    }

    /// Returns the stack as the server left it, with `deleted_at` set.
    pub fn delete_stack(&self, board_id: i64, stack_id: i64) -> Result<Stack, DeckError> {
        self.typed(self.requests.build_delete_stack(board_id, stack_id))
    }

    // Cards

    /// The cards embedded in a stack; a stack without a `cards` key has none.
    pub fn get_cards_from_stack(
        &self,
        board_id: i64,
        stack_id: i64,
    ) -> Result<Vec<Card>, DeckError> {
        deserialized(&self.converter, || {
            let stack = self.raw(self.requests.build_get_stack(board_id, stack_id))?;
            Ok(match stack {
                Value::Object(mut map) => map
                    .remove("cards")
                    .unwrap_or_else(|| Value::Array(Vec::new())),
                _ => Value::Array(Vec::new()),
            })
        })
    }

    pub fn get_card(&self, board_id: i64, stack_id: i64, card_id: i64) -> Result<Card, DeckError> {
        self.typed(self.requests.build_get_card(board_id, stack_id, card_id))
    }

    pub fn create_card(
        &self,
        board_id: i64,
        stack_id: i64,
        input: &CardInput,
    ) -> Result<Card, DeckError> {
        self.typed(self.requests.build_create_card(board_id, stack_id, input)?)
    }

    pub fn update_card(
        &self,
        board_id: i64,
        stack_id: i64,
        card_id: i64,
        input: &CardUpdate,
    ) -> Result<Card, DeckError> {
        self.typed(
            self.requests
                .build_update_card(board_id, stack_id, card_id, input)?,
        )
    }

    pub fn delete_card(
        &self,
        board_id: i64,
        stack_id: i64,
        card_id: i64,
    ) -> Result<Value, DeckError> {
        self.raw(self.requests.build_delete_card(board_id, stack_id, card_id))
    }

    pub fn assign_label_to_card(
        &self,
        board_id: i64,
        stack_id: i64,
        card_id: i64,
        label_id: i64,
    ) -> Result<Value, DeckError> {
        self.raw(
            self.requests
                .build_assign_label(board_id, stack_id, card_id, label_id)?,
        )
    }

    pub fn remove_label_from_card(
        &self,
        board_id: i64,
        stack_id: i64,
        card_id: i64,
        label_id: i64,
    ) -> Result<Value, DeckError> {
        info!(board_id, stack_id, card_id, label_id, "removing label from card");
        self.raw(
            self.requests
                .build_remove_label(board_id, stack_id, card_id, label_id)?,
        )
    }

    pub fn assign_user_to_card(
        &self,
        board_id: i64,
        stack_id: i64,
        card_id: i64,
        user_id: &str,
    ) -> Result<Value, DeckError> {
        self.raw(
            self.requests
                .build_assign_user(board_id, stack_id, card_id, user_id)?,
        )
    }

    pub fn unassign_user_from_card(
        &self,
        board_id: i64,
        stack_id: i64,
        card_id: i64,
        user_id: &str,
    ) -> Result<Value, DeckError> {
        self.raw(
            self.requests
                .build_unassign_user(board_id, stack_id, card_id, user_id)?,
        )
    }

    /// Move a card to position `order` of `target_stack_id`, which may be its
    /// current stack.
    pub fn reorder_card(
        &self,
        board_id: i64,
        stack_id: i64,
        card_id: i64,
        order: i64,
        target_stack_id: i64,
    ) -> Result<Value, DeckError> {
        self.raw(self.requests.build_reorder_card(
            board_id,
            stack_id,
            card_id,
            order,
            target_stack_id,
        )?)
    }

    // Labels

    pub fn get_label(&self, board_id: i64, label_id: i64) -> Result<Label, DeckError> {
        self.typed(self.requests.build_get_label(board_id, label_id))
    }

    pub fn create_label(&self, board_id: i64, input: &LabelInput) -> Result<Label, DeckError> {
        self.typed(self.requests.build_create_label(board_id, input)?)
    }

    pub fn update_label(
        &self,
        board_id: i64,
        label_id: i64,
        input: &LabelInput,
    ) -> Result<Value, DeckError> {
        self.raw(self.requests.build_update_label(board_id, label_id, input)?)
    }

    pub fn delete_label(&self, board_id: i64, label_id: i64) -> Result<Value, DeckError> {
        self.raw(self.requests.build_delete_label(board_id, label_id))
    }

    /// Labels defined on a board, read from the board itself.
    pub fn get_board_labels(&self, board_id: i64) -> Result<Vec<Label>, DeckError> {
        Ok(self.get_board(board_id)?.labels)
    }
}
