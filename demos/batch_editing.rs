/// Batch Editing Example
///
/// This example demonstrates:
/// - Accumulating cell edits, new rows and deletions in Batch mode
/// - Reading provisional values before commit
/// - Committing everything through one `on_batch_save` callback
/// - Serializing the committed changes to JSON

use livegrid::{
    build_row, BatchChanges, CellValue, Column, EditConfig, EditMode, EditSession, Row, RowKey, Schema,
};
use std::cell::RefCell;
use std::rc::Rc;

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    println!("=== LiveGrid Batch Editing Example ===\n");

    let schema = Schema::new(vec![
        Column::new("id", "ID").read_only(),
        Column::new("product", "Product"),
        Column::new("qty", "Quantity"),
    ]);
    let rows: Vec<Row> = vec![
        build_row([("id", CellValue::from(1)), ("product", "Widget".into()), ("qty", 10.into())]),
        build_row([("id", CellValue::from(2)), ("product", "Gadget".into()), ("qty", 5.into())]),
        build_row([("id", CellValue::from(3)), ("product", "Doohickey".into()), ("qty", 15.into())]),
    ];

    let mut session = EditSession::new(EditConfig::with_mode(EditMode::Batch), schema);
    let committed: Rc<RefCell<Option<BatchChanges>>> = Rc::new(RefCell::new(None));
    let sink = committed.clone();
    session.on_batch_save(move |changes| *sink.borrow_mut() = Some(changes.clone()));

    // 1. Two edits on the same row
    println!("1. Editing row 1...");
    let widget = RowKey::Int(1);
    for (field, value) in [("product", CellValue::from("Widget Pro")), ("qty", CellValue::from(12))] {
        session.start_cell_edit(&rows, &widget, field);
        session.update_edit_value(field, value);
        session.save_edit(&rows);
    }
    println!(
        "   product = {}, qty = {} (dirty: {})\n",
        session.get_cell_value(&rows, &widget, "product").cloned().unwrap_or_default(),
        session.get_cell_value(&rows, &widget, "qty").cloned().unwrap_or_default(),
        session.is_row_dirty(&widget)
    );

    // 2. Read-only columns refuse edits
    println!("2. Trying to edit the ID column...");
    session.start_cell_edit(&rows, &widget, "id");
    println!("   editor open: {}\n", session.is_editing());

    // 3. Add and delete
    println!("3. Adding a row and deleting row 3...");
    session.add_new_row();
    session.update_added_row(0, "product", "Thingamajig".into());
    session.update_added_row(0, "qty", 1.into());
    session.delete_row(&rows, &RowKey::Int(3));
    println!("   pending changes: {}\n", session.change_count());

    // 4. Commit
    println!("4. Saving batch...");
    session.save_batch(&rows);
    if let Some(changes) = committed.borrow().as_ref() {
        println!("{}", serde_json::to_string_pretty(changes).unwrap());
    }
    println!("   pending after save: {}", session.change_count());

    println!("\n=== Example Complete ===");
}
