use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use catalog_admin::auth::User;
use catalog_admin::catalog::{format, Product};
use catalog_admin::config::CatalogConfig;
use catalog_admin::context::AppContext;
use catalog_admin::error::{Error, Result};
use catalog_admin::router::{resolve, Route};
use catalog_admin::table::TableChange;
use catalog_admin::validation::{validate_login, LoginCredentials, ProductForm};
use catalog_admin::CatalogAdmin;

#[derive(Parser)]
#[command(name = "catalog-admin", about = "Manage catalog categories and products", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and keep the session for later commands
    Login(LoginArgs),
    /// Forget the stored session
    Logout,
    /// Show the logged in user
    Whoami,
    /// Show the category hierarchy
    Categories {
        /// Only list categories products can be filed under
        #[arg(long)]
        leaves: bool,
    },
    /// List a page of products in a category
    Products(ProductsArgs),
    /// Show a single product
    Product { id: i64 },
    /// Create a product
    Create(CreateArgs),
    /// Update a product
    Update(UpdateArgs),
    /// Delete a product
    Delete { id: i64 },
    /// Show the most recently updated product
    LastUpdated {
        #[arg(long)]
        category: Option<i64>,
    },
}

#[derive(Args)]
struct LoginArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    Ascend,
    Descend,
}

impl OrderArg {
    fn as_str(self) -> &'static str {
        match self {
            OrderArg::Ascend => "ascend",
            OrderArg::Descend => "descend",
        }
    }
}

#[derive(Args)]
struct ProductsArgs {
    #[arg(long)]
    category: i64,
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    limit: Option<u32>,
    /// Field to sort by, e.g. `name` or `updated_at`; camelCase is converted
    #[arg(long)]
    sort: Option<String>,
    #[arg(long, value_enum, requires = "sort")]
    order: Option<OrderArg>,
}

#[derive(Args)]
struct FieldArgs {
    #[arg(long)]
    name: Option<String>,
    /// `active` or `inactive`
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    units: Option<f64>,
    /// Attribute as `code:type:value`; tags take a comma separated list
    #[arg(long = "attr")]
    attributes: Vec<String>,
}

#[derive(Args)]
struct CreateArgs {
    #[arg(long)]
    category: i64,
    #[command(flatten)]
    fields: FieldArgs,
}

#[derive(Args)]
struct UpdateArgs {
    id: i64,
    #[command(flatten)]
    fields: FieldArgs,
    /// Replace the attribute list instead of appending to it
    #[arg(long)]
    replace_attrs: bool,
}

impl Commands {
    /// The screen this command stands for, used for the login guard
    fn route(&self) -> Route {
        match self {
            Commands::Login(_) => Route::Login,
            Commands::Logout | Commands::Whoami | Commands::Categories { .. } => Route::Dashboard,
            Commands::Products(args) => Route::Category(args.category),
            Commands::Create(args) => Route::Category(args.category),
            Commands::Product { id } | Commands::Update(UpdateArgs { id, .. }) | Commands::Delete { id } => {
                Route::Product(*id)
            }
            Commands::LastUpdated { category } => category.map(Route::Category).unwrap_or(Route::Dashboard),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("catalog_admin=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!(error = ?err, "command failed");
            eprintln!("{}", err.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = CatalogConfig::from_env()?;
    let admin = CatalogAdmin::from_config(&config)?;
    let ctx = CatalogAdmin::context(&config).await?;

    let result = dispatch(&admin, &ctx, cli.command).await;
    ctx.teardown().await;
    result
}

async fn guard(ctx: &AppContext, route: Route) -> Result<()> {
    let authenticated = ctx.auth().is_authenticated().await;
    let resolved = resolve(&route.path(), authenticated);
    if resolved == route {
        return Ok(());
    }
    match resolved {
        Route::Login => Err(Error::auth("Please log in first")),
        _ => Err(Error::auth("Already logged in")),
    }
}

async fn dispatch(admin: &CatalogAdmin, ctx: &AppContext, command: Commands) -> Result<()> {
    // Logging out never needs a session
    if !matches!(command, Commands::Logout) {
        guard(ctx, command.route()).await?;
    }

    match command {
        Commands::Login(args) => login(admin, ctx, args).await,
        Commands::Logout => {
            ctx.auth().logout().await?;
            println!("Logged out");
            Ok(())
        }
        Commands::Whoami => {
            if let Some(user) = ctx.auth().user().await {
                print_user(&user);
            }
            Ok(())
        }
        Commands::Categories { leaves } => categories(admin, leaves).await,
        Commands::Products(args) => products(admin, args).await,
        Commands::Product { id } => {
            let product = admin.products().fetch_one(id).await?;
            print_product(&product);
            Ok(())
        }
        Commands::Create(args) => create(admin, args).await,
        Commands::Update(args) => update(admin, args).await,
        Commands::Delete { id } => {
            admin.products().delete(id).await?;
            println!("Deleted product {}", id);
            Ok(())
        }
        Commands::LastUpdated { category } => {
            match admin.products().last_updated(category).await? {
                Some(product) => print_product(&product),
                None => println!("No products yet"),
            }
            Ok(())
        }
    }
}

async fn login(admin: &CatalogAdmin, ctx: &AppContext, args: LoginArgs) -> Result<()> {
    let credentials = LoginCredentials::new(&args.email, &args.password);
    validate_login(&credentials).map_err(Error::Validation)?;

    let response = admin.auth().login(&credentials.email, &credentials.password).await?;
    ctx.auth().login(response.user.clone(), &response.token).await?;
    print_user(&response.user);
    Ok(())
}

async fn categories(admin: &CatalogAdmin, leaves: bool) -> Result<()> {
    if leaves {
        for category in admin.categories().fetch_leaves().await? {
            println!("{:>5}  {}", category.id, category.name);
        }
        return Ok(());
    }

    let tree = admin.categories().fetch_tree().await?;
    for (depth, node) in tree.walk() {
        println!("{:>5}  {}{}", node.id, "  ".repeat(depth), node.name);
    }
    if !tree.unreachable.is_empty() {
        println!("Skipped (parent cycle): {:?}", tree.unreachable);
    }
    Ok(())
}

async fn products(admin: &CatalogAdmin, args: ProductsArgs) -> Result<()> {
    let list = admin.product_list();
    list.set_category(args.category).await;
    let table = list.table().await;
    list.change_table(TableChange {
        current: args.page.or(Some(table.pagination.current)),
        page_size: args.limit.or(Some(table.pagination.page_size)),
        sort_field: args.sort,
        sort_order: args.order.map(|o| o.as_str().to_string()),
    })
    .await;
    list.refresh().await?;

    let table = list.table().await;
    println!(
        "Total Products: {} (page {}, {} per page)",
        table.pagination.total.unwrap_or(0),
        table.pagination.current,
        table.pagination.page_size
    );
    for product in list.products().await {
        println!(
            "{:>5}  {:<24}  {:<11}  {:>6}  {}  {}",
            product.id,
            product.name,
            format::status_label(product.status),
            format::units_display(&product),
            format::timestamp(&product.updated_at),
            format::attribute_summary(&product.attributes),
        );
    }
    Ok(())
}

/// Splits `code:type:value`. Tags values become a list.
fn parse_attribute(raw: &str) -> Result<(String, String, Value)> {
    let mut parts = raw.splitn(3, ':');
    let (Some(code), Some(kind), Some(value)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(Error::invalid_input(format!(
            "attribute must look like code:type:value, got {}",
            raw
        )));
    };
    let value = match kind {
        "tags" | "array" => Value::Array(
            value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_string()))
                .collect(),
        ),
        _ => Value::String(value.to_string()),
    };
    Ok((code.to_string(), kind.to_string(), value))
}

fn apply_fields(form: &mut ProductForm, fields: FieldArgs) -> Result<()> {
    if let Some(name) = fields.name {
        form.set_name(&name);
    }
    if let Some(status) = fields.status {
        form.set_status(&status);
    }
    if let Some(units) = fields.units {
        form.set_units(Some(units));
    }
    for raw in &fields.attributes {
        let (code, kind, value) = parse_attribute(raw)?;
        let index = form.add_attribute();
        form.set_attribute_code(index, &code);
        form.set_attribute_type(index, &kind);
        form.set_attribute_value(index, value);
    }
    Ok(())
}

async fn create(admin: &CatalogAdmin, args: CreateArgs) -> Result<()> {
    let mut form = ProductForm::create(Some(args.category))?;
    apply_fields(&mut form, args.fields)?;
    let draft = form.submit(|draft| draft).map_err(Error::Validation)?;

    let product = admin.products().create(&draft).await?;
    println!("Created product {}", product.id);
    print_product(&product);
    Ok(())
}

async fn update(admin: &CatalogAdmin, args: UpdateArgs) -> Result<()> {
    let current = admin.products().fetch_one(args.id).await?;
    let mut form = ProductForm::edit(&current);
    if args.replace_attrs {
        while form.remove_attribute(0) {}
    }
    apply_fields(&mut form, args.fields)?;
    let draft = form.submit(|draft| draft).map_err(Error::Validation)?;

    let product = admin.products().update(args.id, &draft).await?;
    println!("Updated product {}", product.id);
    print_product(&product);
    Ok(())
}

fn print_user(user: &User) {
    println!(
        "[{}] {} <{}>",
        format::initials(user.name.as_deref()),
        user.name.as_deref().unwrap_or("-"),
        user.email
    );
}

fn print_product(product: &Product) {
    println!("#{} {}", product.id, product.name);
    println!("  Category:   {}", product.category_id);
    println!("  Status:     {}", format::status_label(product.status));
    println!("  Units:      {}", format::units_display(product));
    println!("  Attributes: {}", format::attribute_summary(&product.attributes));
    println!("  Created:    {}", format::timestamp(&product.created_at));
    println!("  Updated:    {}", format::timestamp(&product.updated_at));
}
