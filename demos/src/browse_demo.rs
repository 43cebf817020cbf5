use catalog_admin::catalog::format;
use catalog_admin::config::CatalogConfig;
use catalog_admin::table::TableChange;
use catalog_admin::CatalogAdmin;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("catalog_admin=debug")))
        .init();

    // Needs CATALOG_API_URL pointing at a running backend
    let config = CatalogConfig::from_env()?;
    let admin = CatalogAdmin::from_config(&config)?;

    let leaves = admin.categories().fetch_leaves().await?;
    let Some(category) = leaves.first() else {
        println!("No leaf categories found");
        return Ok(());
    };
    println!("Browsing {} ({})", category.name, category.id);

    let list = admin.product_list();
    list.set_category(category.id).await;
    list.change_table(TableChange {
        current: Some(1),
        page_size: Some(5),
        sort_field: Some("updatedAt".to_string()),
        sort_order: Some("descend".to_string()),
    })
    .await;
    list.refresh().await?;

    let table = list.table().await;
    println!("Total Products: {}", table.pagination.total.unwrap_or(0));
    for product in list.products().await {
        println!(
            "  {} | {} | {} | {}",
            product.name,
            format::status_label(product.status),
            format::units_display(&product),
            format::attribute_summary(&product.attributes)
        );
    }

    if let Some(newest) = admin.products().last_updated(Some(category.id)).await? {
        println!("Last updated: {} at {}", newest.name, format::timestamp(&newest.updated_at));
    }
    Ok(())
}
