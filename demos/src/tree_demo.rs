use catalog_admin::catalog::{find_category_by_id, Category, CategoryTree};

fn main() {
    let categories = vec![
        Category::new(1, "Electronics", None),
        Category::new(2, "Home", None),
        Category::new(3, "Phones", Some(1)),
        Category::new(4, "Laptops", Some(1)),
        Category::new(5, "Android", Some(3)),
        Category::new(6, "Kitchen", Some(2)),
        // Parent 99 does not exist
        Category::new(7, "Misc", Some(99)),
        // 8 and 9 point at each other
        Category::new(8, "Loop A", Some(9)),
        Category::new(9, "Loop B", Some(8)),
    ];

    let tree = CategoryTree::build(&categories);

    println!("Category tree:");
    for (depth, node) in tree.walk() {
        let marker = if node.is_leaf() { "-" } else { "+" };
        println!("{}{} {} ({})", "  ".repeat(depth), marker, node.name, node.id);
    }

    println!("\nOrphans promoted to roots: {:?}", tree.orphans);
    println!("Left out because of a parent cycle: {:?}", tree.unreachable);

    for id in [5, 8] {
        match find_category_by_id(&tree.roots, id) {
            Some(node) => println!("Lookup {}: {} with {} children", id, node.name, node.children.len()),
            None => println!("Lookup {}: not found", id),
        }
    }

    match serde_json::to_string_pretty(&tree.roots) {
        Ok(json) => println!("\nAs JSON:\n{}", json),
        Err(e) => println!("could not serialize tree: {}", e),
    }
}
