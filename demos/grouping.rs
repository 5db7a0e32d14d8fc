/// Grouping Example
///
/// This example demonstrates:
/// - Nested grouping by two fields
/// - Collapsing groups and flattening the tree into display rows
/// - Per-group footer aggregates, including a custom aggregator

use livegrid::{
    flatten_groups, rows_from_json, AggregateKind, CellValue, Column, DataGrid, DisplayRow, EditConfig, Schema,
    SelectionConfig,
};

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    println!("=== LiveGrid Grouping Example ===\n");

    let rows = rows_from_json(
        r#"[
            {"id": 1, "region": "North", "rep": "Ann", "amount": 1200},
            {"id": 2, "region": "South", "rep": "Bob", "amount": 800},
            {"id": 3, "region": "North", "rep": "Cid", "amount": 450},
            {"id": 4, "region": "North", "rep": "Ann", "amount": 300},
            {"id": 5, "region": "South", "rep": "Dee", "amount": 975}
        ]"#,
    )
    .unwrap();

    let schema = Schema::new(vec![
        Column::new("region", "Region"),
        Column::new("rep", "Rep"),
        Column::new("amount", "Amount")
            .with_aggregate(AggregateKind::Sum)
            .with_formatter(|v| format!("${}", v)),
        Column::new("id", "Deals").with_aggregate(AggregateKind::custom(|rows, _field| {
            CellValue::from(rows.len() as i64)
        })),
    ]);
    let mut grid = DataGrid::new(schema, SelectionConfig::default(), EditConfig::default());
    grid.grouping_mut()
        .on_group_change(|fields| log::info!("grouping by {:?}", fields));

    // 1. Group by region, then rep
    println!("1. Grouping by region > rep...");
    grid.grouping_mut().add_group("region");
    grid.grouping_mut().add_group("rep");
    let groups = grid.groups(&rows);
    for group in &groups {
        group.walk(&mut |node| {
            let footer: Vec<String> = grid.group_aggregates(node).into_iter().map(|a| a.formatted).collect();
            println!("   {}{} ({}) {}", "  ".repeat(node.level), node.key, node.count, footer.join(", "));
        });
    }

    // 2. Collapse one group
    println!("\n2. Collapsing North...");
    grid.grouping_mut().toggle_collapse("region:North");
    let groups = grid.groups(&rows);
    for item in flatten_groups(&groups) {
        match item {
            DisplayRow::Group(node) => {
                let marker = if node.collapsed { "+" } else { "-" };
                println!("   {} {}{}", marker, "  ".repeat(node.level), node.key);
            }
            DisplayRow::Row(row) => println!("       {} {}", row["rep"], row["amount"]),
        }
    }

    // 3. Grand total
    println!("\n3. Grand total...");
    for aggregate in grid.aggregates(&rows) {
        println!("   {}", aggregate.formatted);
    }

    println!("\n=== Example Complete ===");
}
