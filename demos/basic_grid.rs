/// Basic Grid Example
///
/// This example demonstrates:
/// - Loading rows from JSON and building a grid from a JSON config
/// - Multi-row selection with plain, Ctrl and Shift clicks
/// - Inline row editing with a save callback
/// - Footer aggregates
///
/// Run with `RUST_LOG=debug` to see the engine's state transitions.

use livegrid::{rows_from_json, DataGrid, GridConfig, Modifiers, RowKey};
use std::cell::RefCell;
use std::rc::Rc;

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    println!("=== LiveGrid Basic Example ===\n");

    // 1. Rows and config
    println!("1. Loading data...");
    let mut rows = rows_from_json(
        r#"[
            {"id": 1, "name": "Alice",   "dept": "Eng",   "salary": 120000, "remote": true},
            {"id": 2, "name": "Bob",     "dept": "Sales", "salary": 85000,  "remote": false},
            {"id": 3, "name": "Charlie", "dept": "Eng",   "salary": 110000, "remote": true},
            {"id": 4, "name": "Diana",   "dept": "Ops",   "salary": 95000,  "remote": false}
        ]"#,
    )
    .unwrap();

    let config = GridConfig::from_json(
        r#"{
            "selection": {"mode": "multiple"},
            "columns": [
                {"field": "id", "editable": false},
                {"field": "name", "header": "Name"},
                {"field": "dept", "header": "Department"},
                {"field": "salary", "header": "Salary", "aggregate": "average"},
                {"field": "remote", "header": "Remote", "aggregate": "true_count"}
            ]
        }"#,
    )
    .unwrap();
    let mut grid = DataGrid::from_config(&config).unwrap();
    println!("   {} rows, {} columns\n", rows.len(), grid.schema().len());

    // 2. Selection
    println!("2. Selecting rows...");
    grid.selection_mut()
        .on_selection_change(|selected| log::info!("selection now {} rows", selected.len()));

    grid.selection_mut().handle_row_click(&rows, 0, Modifiers::NONE);
    grid.selection_mut().handle_row_click(&rows, 2, Modifiers::SHIFT);
    println!("   After shift-click: {:?}", grid.selection().selected_row_keys());

    grid.selection_mut().handle_row_click(&rows, 1, Modifiers::CTRL);
    println!("   After ctrl-click:  {:?}", grid.selection().selected_row_keys());
    println!("   Indeterminate header: {}\n", grid.selection().is_some_selected(&rows));

    // 3. Inline editing
    println!("3. Editing Bob's salary...");
    let saved = Rc::new(RefCell::new(None));
    let sink = saved.clone();
    grid.editing_mut().on_save(move |edited, _original| {
        *sink.borrow_mut() = Some(edited.clone());
    });

    let bob = RowKey::Int(2);
    grid.editing_mut().start_edit(&rows, &bob);
    grid.editing_mut().update_edit_value("salary", 90000.into());
    grid.editing_mut().save_edit(&rows);

    let index = grid.key_accessor().find(&rows, &bob).map(|(i, _)| i);
    if let (Some(index), Some(edited)) = (index, saved.borrow_mut().take()) {
        rows[index] = edited;
    }
    println!("   Bob now earns {}\n", rows[1]["salary"]);

    // 4. Footer
    println!("4. Footer aggregates...");
    for aggregate in grid.aggregates(&rows) {
        println!("   {:<8} {}", aggregate.field, aggregate.formatted);
    }

    println!("\n=== Example Complete ===");
}
