//! In-memory state behind the mock server.
//!
//! Rows are stored flat and joined on read: a board's labels, ACL rules and
//! users, a stack's cards and a card's labels and assignees are all rendered
//! from the flat tables. Deletion is soft (`deleted_at` is set) for boards,
//! stacks and cards, matching the real service.

use std::collections::{BTreeMap, BTreeSet};

use axum::http::StatusCode;

use crate::model::{
    Acl, AclInput, AclUpdate, Assignment, Board, BoardInput, BoardUpdate, Card, CardInput,
    CardUpdate, Label, LabelInput, Stack, StackInput, User,
};

const PERMISSIONS: &[&str] = &[
    "PERMISSION_READ",
    "PERMISSION_EDIT",
    "PERMISSION_MANAGE",
    "PERMISSION_SHARE",
];

pub type StoreResult<T> = Result<T, StatusCode>;

#[derive(Debug, Default)]
pub struct Deck {
    clock: i64,
    next_id: i64,
    boards: BTreeMap<i64, Board>,
    stacks: BTreeMap<i64, Stack>,
    cards: BTreeMap<i64, Card>,
    labels: BTreeMap<i64, Label>,
    acl: BTreeMap<i64, Acl>,
    card_labels: BTreeSet<(i64, i64)>,
    assignments: BTreeMap<i64, Assignment>,
}

/// Which cards a rendered stack carries.
#[derive(Clone, Copy, PartialEq, Eq)]
enum CardFilter {
    Active,
    Archived,
}

impl Deck {
    /// Monotonic clock: never behind wall-clock seconds, always advancing.
    fn tick(&mut self) -> i64 {
        self.clock = (self.clock + 1).max(chrono::Utc::now().timestamp());
        self.clock
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    // Rendering

    fn render_board(&self, board_id: i64) -> StoreResult<Board> {
        let mut board = self.boards.get(&board_id).cloned().ok_or(StatusCode::NOT_FOUND)?;
        board.labels = self
            .labels
            .values()
            .filter(|label| label.board_id == board_id)
            .cloned()
            .collect();
        board.acl = self
            .acl
            .values()
            .filter(|acl| acl.board_id == board_id)
            .cloned()
            .collect();
        board.users = std::iter::once(User::named(&board.owner))
            .chain(
                board
                    .acl
                    .iter()
                    .filter(|acl| acl.participant_type == 0)
                    .map(|acl| acl.participant.clone()),
            )
            .collect();
        Ok(board)
    }

    fn render_card(&self, card_id: i64) -> StoreResult<Card> {
        let mut card = self.cards.get(&card_id).cloned().ok_or(StatusCode::NOT_FOUND)?;
        card.labels = self
            .card_labels
            .iter()
            .filter(|(card, _)| *card == card_id)
            .filter_map(|(_, label_id)| self.labels.get(label_id))
            .map(|label| Label {
                card_id: Some(card_id),
                ..label.clone()
            })
            .collect();
        card.assigned_users = self
            .assignments
            .values()
            .filter(|assignment| assignment.card_id == card_id)
            .cloned()
            .collect();
        Ok(card)
    }

    fn cards_in(&self, stack_id: i64, filter: CardFilter) -> Vec<Card> {
        let mut cards: Vec<Card> = self
            .cards
            .values()
            .filter(|card| card.stack_id == stack_id && card.deleted_at == 0)
            .filter(|card| card.archived == (filter == CardFilter::Archived))
            .filter_map(|card| self.render_card(card.id).ok())
            .collect();
        cards.sort_by_key(|card| (card.order, card.id));
        cards
    }

    fn render_stack(&self, stack_id: i64, filter: CardFilter) -> StoreResult<Stack> {
        let mut stack = self.stacks.get(&stack_id).cloned().ok_or(StatusCode::NOT_FOUND)?;
        let cards = self.cards_in(stack_id, filter);
        stack.cards = (!cards.is_empty()).then_some(cards);
        Ok(stack)
    }

    // Lookups scoped to a board

    fn board(&self, board_id: i64) -> StoreResult<&Board> {
        self.boards.get(&board_id).ok_or(StatusCode::NOT_FOUND)
    }

    fn stack(&self, board_id: i64, stack_id: i64) -> StoreResult<&Stack> {
        self.board(board_id)?;
        self.stacks
            .get(&stack_id)
            .filter(|stack| stack.board_id == board_id)
            .ok_or(StatusCode::NOT_FOUND)
    }

    fn card(&self, board_id: i64, stack_id: i64, card_id: i64) -> StoreResult<&Card> {
        self.stack(board_id, stack_id)?;
        self.cards
            .get(&card_id)
            .filter(|card| card.stack_id == stack_id && card.deleted_at == 0)
            .ok_or(StatusCode::NOT_FOUND)
    }

    fn label(&self, board_id: i64, label_id: i64) -> StoreResult<&Label> {
        self.board(board_id)?;
        self.labels
            .get(&label_id)
            .filter(|label| label.board_id == board_id)
            .ok_or(StatusCode::NOT_FOUND)
    }

    // Boards

    pub fn list_boards(&self) -> Vec<Board> {
        self.boards
            .values()
            .filter(|board| board.deleted_at == 0)
            .filter_map(|board| self.render_board(board.id).ok())
            .collect()
    }

    pub fn get_board(&self, board_id: i64) -> StoreResult<Board> {
        self.render_board(board_id)
    }

    pub fn create_board(&mut self, owner: &str, input: BoardInput) -> StoreResult<Board> {
        let id = self.next_id();
        let now = self.tick();
        let board = Board {
            id,
            title: input.title,
            owner: owner.to_string(),
            color: input.color,
            archived: false,
            labels: Vec::new(),
            acl: Vec::new(),
            permissions: PERMISSIONS.iter().map(|p| (p.to_string(), true)).collect(),
            users: Vec::new(),
            deleted_at: 0,
            last_modified: now,
        };
        self.boards.insert(id, board);
        self.render_board(id)
    }

    pub fn update_board(&mut self, board_id: i64, input: BoardUpdate) -> StoreResult<Board> {
        let now = self.tick();
        let board = self.boards.get_mut(&board_id).ok_or(StatusCode::NOT_FOUND)?;
        board.title = input.title;
        board.color = input.color;
        board.archived = input.archived;
        board.last_modified = now;
        self.render_board(board_id)
    }

    pub fn delete_board(&mut self, board_id: i64) -> StoreResult<Board> {
        self.set_board_deleted(board_id, true)
    }

    pub fn undo_delete_board(&mut self, board_id: i64) -> StoreResult<Board> {
        self.set_board_deleted(board_id, false)
    }

    fn set_board_deleted(&mut self, board_id: i64, deleted: bool) -> StoreResult<Board> {
        let now = self.tick();
        let board = self.boards.get_mut(&board_id).ok_or(StatusCode::NOT_FOUND)?;
        board.deleted_at = if deleted { now } else { 0 };
        board.last_modified = now;
        self.render_board(board_id)
    }

    pub fn add_acl(&mut self, board_id: i64, input: AclInput) -> StoreResult<Acl> {
        self.board(board_id)?;
        let id = self.next_id();
        let acl = Acl {
            id,
            participant: User::named(&input.participant),
            participant_type: input.participant_type,
            board_id,
            permission_edit: input.permission_edit,
            permission_share: input.permission_share,
            permission_manage: input.permission_manage,
            owner: false,
        };
        self.acl.insert(id, acl.clone());
        Ok(acl)
    }

    pub fn update_acl(&mut self, board_id: i64, acl_id: i64, input: AclUpdate) -> StoreResult<Acl> {
        let acl = self
            .acl
            .get_mut(&acl_id)
            .filter(|acl| acl.board_id == board_id)
            .ok_or(StatusCode::NOT_FOUND)?;
        acl.permission_edit = input.permission_edit;
        acl.permission_share = input.permission_share;
        acl.permission_manage = input.permission_manage;
        Ok(acl.clone())
    }

    pub fn delete_acl(&mut self, board_id: i64, acl_id: i64) -> StoreResult<Acl> {
        match self.acl.get(&acl_id) {
            Some(acl) if acl.board_id == board_id => {}
            _ => return Err(StatusCode::NOT_FOUND),
        }
        self.acl.remove(&acl_id).ok_or(StatusCode::NOT_FOUND)
    }

    // Stacks

    pub fn list_stacks(&self, board_id: i64) -> StoreResult<Vec<Stack>> {
        self.stacks_of(board_id, CardFilter::Active)
    }

    /// Stacks holding archived cards, each carrying only those cards.
    pub fn list_archived_stacks(&self, board_id: i64) -> StoreResult<Vec<Stack>> {
        Ok(self
            .stacks_of(board_id, CardFilter::Archived)?
            .into_iter()
            .filter(|stack| stack.cards.is_some())
            .collect())
    }

    fn stacks_of(&self, board_id: i64, filter: CardFilter) -> StoreResult<Vec<Stack>> {
        self.board(board_id)?;
        let mut stacks: Vec<Stack> = self
            .stacks
            .values()
            .filter(|stack| stack.board_id == board_id && stack.deleted_at == 0)
            .filter_map(|stack| self.render_stack(stack.id, filter).ok())
            .collect();
        stacks.sort_by_key(|stack| (stack.order, stack.id));
        Ok(stacks)
    }

    pub fn get_stack(&self, board_id: i64, stack_id: i64) -> StoreResult<Stack> {
        self.stack(board_id, stack_id)?;
        self.render_stack(stack_id, CardFilter::Active)
    }

    pub fn create_stack(&mut self, board_id: i64, input: StackInput) -> StoreResult<Stack> {
        self.board(board_id)?;
        let id = self.next_id();
        let now = self.tick();
        let stack = Stack {
            id,
            title: input.title,
            board_id,
            order: input.order,
            deleted_at: 0,
            last_modified: now,
            cards: None,
        };
        self.stacks.insert(id, stack.clone());
        Ok(stack)
    }

    pub fn update_stack(
        &mut self,
        board_id: i64,
        stack_id: i64,
        input: StackInput,
    ) -> StoreResult<Stack> {
        self.stack(board_id, stack_id)?;
        let now = self.tick();
        if let Some(stack) = self.stacks.get_mut(&stack_id) {
            stack.title = input.title;
            stack.order = input.order;
            stack.last_modified = now;
        }
        self.render_stack(stack_id, CardFilter::Active)
    }

    pub fn delete_stack(&mut self, board_id: i64, stack_id: i64) -> StoreResult<Stack> {
        self.stack(board_id, stack_id)?;
        let now = self.tick();
        if let Some(stack) = self.stacks.get_mut(&stack_id) {
            stack.deleted_at = now;
            stack.last_modified = now;
        }
        self.render_stack(stack_id, CardFilter::Active)
    }

    // Cards

    pub fn get_card(&self, board_id: i64, stack_id: i64, card_id: i64) -> StoreResult<Card> {
        self.card(board_id, stack_id, card_id)?;
        self.render_card(card_id)
    }

    pub fn create_card(
        &mut self,
        owner: &str,
        board_id: i64,
        stack_id: i64,
        input: CardInput,
    ) -> StoreResult<Card> {
        self.stack(board_id, stack_id)?;
        let id = self.next_id();
        let now = self.tick();
        let card = Card {
            id,
            title: input.title,
            stack_id,
            card_type: input.card_type,
            last_modified: now,
            created_at: now,
            labels: Vec::new(),
            assigned_users: Vec::new(),
            owner: owner.to_string(),
            order: input.order,
            archived: false,
            notified: false,
            deleted_at: 0,
            duedate: input.duedate,
            description: input.description,
        };
        self.cards.insert(id, card);
        self.render_card(id)
    }

    pub fn update_card(
        &mut self,
        board_id: i64,
        stack_id: i64,
        card_id: i64,
        input: CardUpdate,
    ) -> StoreResult<Card> {
        self.card(board_id, stack_id, card_id)?;
        let now = self.tick();
        if let Some(card) = self.cards.get_mut(&card_id) {
            card.owner = input.owner;
            card.title = input.title;
            card.card_type = input.card_type;
            card.order = input.order;
            card.description = input.description;
            card.duedate = input.duedate;
            if let Some(archived) = input.archived {
                card.archived = archived;
            }
            card.last_modified = now;
        }
        self.render_card(card_id)
    }

    pub fn delete_card(&mut self, board_id: i64, stack_id: i64, card_id: i64) -> StoreResult<Card> {
        self.card(board_id, stack_id, card_id)?;
        let now = self.tick();
        if let Some(card) = self.cards.get_mut(&card_id) {
            card.deleted_at = now;
            card.last_modified = now;
        }
        self.render_card(card_id)
    }

    pub fn assign_label(
        &mut self,
        board_id: i64,
        stack_id: i64,
        card_id: i64,
        label_id: i64,
    ) -> StoreResult<()> {
        self.card(board_id, stack_id, card_id)?;
        self.label(board_id, label_id)?;
        self.card_labels.insert((card_id, label_id));
        self.touch_card(card_id);
        Ok(())
    }

    pub fn remove_label(
        &mut self,
        board_id: i64,
        stack_id: i64,
        card_id: i64,
        label_id: i64,
    ) -> StoreResult<()> {
        self.card(board_id, stack_id, card_id)?;
        self.label(board_id, label_id)?;
        if !self.card_labels.remove(&(card_id, label_id)) {
            return Err(StatusCode::BAD_REQUEST);
        }
        self.touch_card(card_id);
        Ok(())
    }

    pub fn assign_user(
        &mut self,
        board_id: i64,
        stack_id: i64,
        card_id: i64,
        uid: &str,
    ) -> StoreResult<Assignment> {
        self.card(board_id, stack_id, card_id)?;
        if self.assignment_of(card_id, uid).is_some() {
            return Err(StatusCode::BAD_REQUEST);
        }
        let id = self.next_id();
        let assignment = Assignment {
            id,
            participant: User::named(uid),
            card_id,
            participant_type: 0,
        };
        self.assignments.insert(id, assignment.clone());
        self.touch_card(card_id);
        Ok(assignment)
    }

    pub fn unassign_user(
        &mut self,
        board_id: i64,
        stack_id: i64,
        card_id: i64,
        uid: &str,
    ) -> StoreResult<Assignment> {
        self.card(board_id, stack_id, card_id)?;
        let id = self.assignment_of(card_id, uid).ok_or(StatusCode::BAD_REQUEST)?;
        let assignment = self.assignments.remove(&id).ok_or(StatusCode::BAD_REQUEST)?;
        self.touch_card(card_id);
        Ok(assignment)
    }

    fn assignment_of(&self, card_id: i64, uid: &str) -> Option<i64> {
        self.assignments
            .values()
            .find(|a| a.card_id == card_id && a.participant.uid == uid)
            .map(|a| a.id)
    }

    /// Move a card into `target_stack_id` at `order`; returns the target
    /// stack's cards afterwards.
    pub fn reorder_card(
        &mut self,
        board_id: i64,
        stack_id: i64,
        card_id: i64,
        order: i64,
        target_stack_id: i64,
    ) -> StoreResult<Vec<Card>> {
        self.card(board_id, stack_id, card_id)?;
        self.stack(board_id, target_stack_id)?;
        let now = self.tick();
        if let Some(card) = self.cards.get_mut(&card_id) {
            card.stack_id = target_stack_id;
            card.order = order;
            card.last_modified = now;
        }
        Ok(self.cards_in(target_stack_id, CardFilter::Active))
    }

    fn touch_card(&mut self, card_id: i64) {
        let now = self.tick();
        if let Some(card) = self.cards.get_mut(&card_id) {
            card.last_modified = now;
        }
    }

    // Labels

    pub fn get_label(&self, board_id: i64, label_id: i64) -> StoreResult<Label> {
        self.label(board_id, label_id).cloned()
    }

    pub fn create_label(&mut self, board_id: i64, input: LabelInput) -> StoreResult<Label> {
        self.board(board_id)?;
        let id = self.next_id();
        let now = self.tick();
        let label = Label {
            id,
            title: input.title,
            color: input.color,
            board_id,
            card_id: None,
            last_modified: now,
        };
        self.labels.insert(id, label.clone());
        Ok(label)
    }

    pub fn update_label(
        &mut self,
        board_id: i64,
        label_id: i64,
        input: LabelInput,
    ) -> StoreResult<Label> {
        self.label(board_id, label_id)?;
        let now = self.tick();
        let label = self.labels.get_mut(&label_id).ok_or(StatusCode::NOT_FOUND)?;
        label.title = input.title;
        label.color = input.color;
        label.last_modified = now;
        Ok(label.clone())
    }

    pub fn delete_label(&mut self, board_id: i64, label_id: i64) -> StoreResult<Label> {
        self.label(board_id, label_id)?;
        self.card_labels.retain(|(_, label)| *label != label_id);
        self.labels.remove(&label_id).ok_or(StatusCode::NOT_FOUND)
    }
}
