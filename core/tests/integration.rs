//! End-to-end tests against the live mock server.
//!
//! # Design
//! Each test starts the mock server on a random port in a background thread,
//! then drives the blocking client over real HTTP through `UreqTransport`.
//! The server speaks camelCase, so every typed call also exercises key
//! normalization and structuring end to end.

use deck_core::{
    AclPermissions, AclRuleInput, BoardInput, BoardUpdate, CardInput, CardUpdate, DeckClient,
    DeckConfig, DeckError, LabelInput, StackInput, StructureError,
};
use serde_json::Value;

/// Start a fresh mock server and return its base URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            deck_mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn client() -> DeckClient {
    DeckClient::new(&DeckConfig::new(start_server(), "Admin", "admin"))
}

#[test]
fn board_lifecycle() {
    let client = client();

    // Step 1: no boards yet.
    assert!(client.get_boards().unwrap().is_empty());

    // Step 2: create one.
    let board = client.create_board(&BoardInput::new("Roadmap")).unwrap();
    assert!(board.id > 0);
    assert_eq!(board.title, "Roadmap");
    assert_eq!(board.owner, "Admin");
    assert_eq!(board.color, "ff0000");
    assert!(!board.archived);
    assert!(!board.is_deleted());
    assert_eq!(board.permissions.get("permission_read"), Some(&true));

    // Step 3: it is listed and fetchable.
    let boards = client.get_boards().unwrap();
    assert_eq!(boards.len(), 1);
    assert_eq!(client.get_board(board.id).unwrap(), board);

    // Step 4: update returns the raw camelCase body.
    let update = BoardUpdate {
        title: "Roadmap 2".to_string(),
        color: "00ff00".to_string(),
        archived: true,
    };
    let raw = client.update_board(board.id, &update).unwrap();
    assert_eq!(raw["title"], "Roadmap 2");
    assert!(raw.get("lastModified").is_some());
    let fetched = client.get_board(board.id).unwrap();
    assert_eq!(fetched.title, "Roadmap 2");
    assert!(fetched.archived);

    // Step 5: delete, then undo.
    let deleted = client.delete_board(board.id).unwrap();
    assert!(deleted["deletedAt"].as_i64().unwrap() > 0);
    assert!(client.get_boards().unwrap().is_empty());
    client.undo_delete_board(board.id).unwrap();
    assert!(!client.get_board(board.id).unwrap().is_deleted());
}

#[test]
fn acl_rules() {
    let client = client();
    let board = client.create_board(&BoardInput::new("Shared")).unwrap();

    let rule = AclRuleInput {
        participant_type: 0,
        participant: "alice".to_string(),
        permission_edit: true,
        permission_share: false,
        permission_manage: false,
    };
    let added = client.add_board_acl_rule(board.id, &rule).unwrap();
    let acl_id = added["id"].as_i64().unwrap();

    let board = client.get_board(board.id).unwrap();
    assert_eq!(board.acl.len(), 1);
    assert_eq!(board.acl[0].participant.uid, "alice");
    assert!(board.acl[0].permission_edit);
    assert!(board.users.iter().any(|user| user.uid == "alice"));

    let permissions = AclPermissions {
        permission_share: true,
        ..AclPermissions::default()
    };
    client
        .update_board_acl_rule(board.id, acl_id, &permissions)
        .unwrap();
    let entry = &client.get_board(board.id).unwrap().acl[0];
    assert!(!entry.permission_edit);
    assert!(entry.permission_share);

    client.delete_board_acl_rule(board.id, acl_id).unwrap();
    assert!(client.get_board(board.id).unwrap().acl.is_empty());
}

#[test]
fn stacks_and_cards() {
    let client = client();
    let board = client.create_board(&BoardInput::new("Work")).unwrap();

    // A new stack carries no cards key; it still structures with no cards.
    let stack = client
        .create_stack(board.id, &StackInput::new("To do"))
        .unwrap();
    assert_eq!(stack.board_id, board.id);
    assert!(stack.cards.is_empty());
    assert!(client
        .get_cards_from_stack(board.id, stack.id)
        .unwrap()
        .is_empty());

    let card = client
        .create_card(board.id, stack.id, &CardInput::new("Write docs"))
        .unwrap();
    assert_eq!(card.title, "Write docs");
    assert_eq!(card.stack_id, stack.id);
    assert_eq!(card.card_type, "plain");
    assert_eq!(card.owner, "Admin");
    assert!(card.description.is_none());

    let stacks = client.get_stacks(board.id).unwrap();
    assert_eq!(stacks.len(), 1);
    assert_eq!(stacks[0].cards.len(), 1);
    assert_eq!(client.get_card(board.id, stack.id, card.id).unwrap(), card);

    // Update replaces the card and advances last_modified.
    let mut update = CardUpdate::new("Admin", "Write better docs");
    update.description = "with examples".to_string();
    let updated = client
        .update_card(board.id, stack.id, card.id, &update)
        .unwrap();
    assert_eq!(updated.title, "Write better docs");
    assert_eq!(updated.description.as_deref(), Some("with examples"));
    assert!(updated.last_modified > card.last_modified);

    // Rename the stack; the raw body comes back camelCase.
    let renamed = client
        .update_stack(board.id, stack.id, &StackInput::new("Backlog"))
        .unwrap();
    assert_eq!(renamed["title"], "Backlog");
    assert_eq!(renamed["boardId"], board.id);

    // Deleting a card hides it from the stack.
    let deleted = client.delete_card(board.id, stack.id, card.id).unwrap();
    assert!(deleted["deletedAt"].as_i64().unwrap() > 0);
    assert!(client
        .get_cards_from_stack(board.id, stack.id)
        .unwrap()
        .is_empty());

    // Deleting a stack stamps deleted_at.
    let gone = client.delete_stack(board.id, stack.id).unwrap();
    assert!(gone.deleted_at > 0);
    assert!(gone.is_deleted());
    assert!(client.get_stacks(board.id).unwrap().is_empty());
}

#[test]
fn archived_cards_are_listed_separately() {
    let client = client();
    let board = client.create_board(&BoardInput::new("Archive")).unwrap();
    let stack = client.create_stack(board.id, &StackInput::new("Done")).unwrap();
    assert_eq!(client.get_stack(board.id, stack.id).unwrap(), stack);
    assert!(client.get_archived_stacks(board.id).unwrap().is_empty());

    let card = client
        .create_card(board.id, stack.id, &CardInput::new("Old news"))
        .unwrap();
    client
        .create_card(board.id, stack.id, &CardInput::new("Current"))
        .unwrap();
    let archive = CardUpdate {
        archived: Some(true),
        ..CardUpdate::new("Admin", "Old news")
    };
    let archived = client
        .update_card(board.id, stack.id, card.id, &archive)
        .unwrap();
    assert!(archived.archived);

    let archived_stacks = client.get_archived_stacks(board.id).unwrap();
    assert_eq!(archived_stacks.len(), 1);
    assert_eq!(archived_stacks[0].id, stack.id);
    assert_eq!(archived_stacks[0].board_id, board.id);
    assert_eq!(archived_stacks[0].cards.len(), 1);
    assert_eq!(archived_stacks[0].cards[0].id, card.id);
    assert!(archived_stacks[0].cards[0].archived);

    // The active listing keeps only the other card.
    let active = client.get_stack(board.id, stack.id).unwrap();
    assert_eq!(active.title, "Done");
    assert_eq!(active.cards.len(), 1);
    assert_eq!(active.cards[0].title, "Current");
}

#[test]
fn move_card_between_stacks() {
    let client = client();
    let board = client.create_board(&BoardInput::new("Flow")).unwrap();
    let from = client.create_stack(board.id, &StackInput::new("Doing")).unwrap();
    let to = client.create_stack(board.id, &StackInput::new("Done")).unwrap();
    let card = client
        .create_card(board.id, from.id, &CardInput::new("Ship"))
        .unwrap();
    client
        .create_card(board.id, from.id, &CardInput::new("Stay"))
        .unwrap();

    let before_from = client.get_cards_from_stack(board.id, from.id).unwrap().len();
    let before_to = client.get_cards_from_stack(board.id, to.id).unwrap().len();

    client
        .reorder_card(board.id, from.id, card.id, 0, to.id)
        .unwrap();

    let after_from = client.get_cards_from_stack(board.id, from.id).unwrap();
    let after_to = client.get_cards_from_stack(board.id, to.id).unwrap();
    assert_eq!(after_from.len(), before_from - 1);
    assert_eq!(after_to.len(), before_to + 1);

    let moved = client.get_card(board.id, to.id, card.id).unwrap();
    assert_eq!(moved.stack_id, to.id);
    assert_eq!(moved.title, "Ship");

    // The card is no longer reachable through its old stack.
    let err = client.get_card(board.id, from.id, card.id).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn labels_on_cards() {
    let client = client();
    let board = client.create_board(&BoardInput::new("Tags")).unwrap();
    let stack = client.create_stack(board.id, &StackInput::new("To do")).unwrap();
    let card = client
        .create_card(board.id, stack.id, &CardInput::new("Triage"))
        .unwrap();

    let label = client
        .create_label(board.id, &LabelInput::new("urgent"))
        .unwrap();
    let label_id = label.id.unwrap();
    assert_eq!(label.board_id, Some(board.id));
    assert_eq!(label.color.as_deref(), Some("ff0000"));
    assert_eq!(client.get_label(board.id, label_id).unwrap(), label);

    let board_labels = client.get_board_labels(board.id).unwrap();
    assert_eq!(board_labels.len(), 1);
    assert_eq!(board_labels[0].id, Some(label_id));

    client
        .assign_label_to_card(board.id, stack.id, card.id, label_id)
        .unwrap();
    let tagged = client.get_card(board.id, stack.id, card.id).unwrap();
    assert_eq!(tagged.labels.len(), 1);
    assert_eq!(tagged.labels[0].id, Some(label_id));
    assert!(tagged.has_label(label_id));

    client
        .remove_label_from_card(board.id, stack.id, card.id, label_id)
        .unwrap();
    let untagged = client.get_card(board.id, stack.id, card.id).unwrap();
    assert!(untagged.labels.is_empty());

    // Removing a label that is not assigned is rejected by the server.
    let err = client
        .remove_label_from_card(board.id, stack.id, card.id, label_id)
        .unwrap_err();
    assert!(matches!(err, DeckError::HttpStatus { status: 400, .. }));

    let recolored = client
        .update_label(
            board.id,
            label_id,
            &LabelInput {
                title: "later".to_string(),
                color: "0000ff".to_string(),
            },
        )
        .unwrap();
    assert_eq!(recolored["color"], "0000ff");
    client.delete_label(board.id, label_id).unwrap();
    assert!(client.get_board_labels(board.id).unwrap().is_empty());
}

#[test]
fn users_on_cards() {
    let client = client();
    let board = client.create_board(&BoardInput::new("People")).unwrap();
    let stack = client.create_stack(board.id, &StackInput::new("To do")).unwrap();
    let card = client
        .create_card(board.id, stack.id, &CardInput::new("Review"))
        .unwrap();

    let assigned = client
        .assign_user_to_card(board.id, stack.id, card.id, "bob")
        .unwrap();
    assert_eq!(assigned["participant"]["uid"], "bob");

    let unassigned = client
        .unassign_user_from_card(board.id, stack.id, card.id, "bob")
        .unwrap();
    assert_eq!(unassigned["cardId"], card.id);
}

#[test]
fn missing_resources_surface_status_errors() {
    let client = client();

    let err = client.get_board(999).unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, DeckError::HttpStatus { status: 404, .. }));

    let board = client.create_board(&BoardInput::new("Lonely")).unwrap();
    let err = client.get_stack(board.id, 999).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn error_statuses_pass_through_when_not_raising() {
    let config = DeckConfig::new(start_server(), "Admin", "admin").with_raise_for_status(false);
    let client = DeckClient::new(&config);

    // The empty 404 body decodes to null for raw calls...
    let raw = client.delete_label(1, 999).unwrap();
    assert_eq!(raw, Value::Null);

    // ...and fails structuring for typed ones.
    let err = client.get_board(999).unwrap_err();
    assert!(matches!(
        err,
        DeckError::Structure(StructureError::Type { .. })
    ));
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = DeckClient::new(&DeckConfig::new(format!("http://{addr}"), "Admin", "admin"));
    let err = client.get_boards().unwrap_err();
    assert!(err.is_transport());
}
