//! CLI smoke entry point.
//!
//! # Responsibility
//! - Wire configuration, logging, storage and the item service end to end.
//! - Replay the create / list / update / delete walkthrough and print each step.
//! - Register a demo account with the configured hash cost and authenticate it.

use log::error;
use marketplace_core::db::{open_db, open_db_in_memory};
use marketplace_core::{
    classify, core_version, init_logging, AccountService, Argon2Hasher, CoreConfig, CoreError,
    CoreResult, ErrorKind, ItemPatch, ItemService, ItemStore, NewAccount, NewItem,
    SqliteAccountRepository, SqliteItemStore,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error_kind={}", err.kind());
            eprintln!("error [{} {}]: {}", err.kind(), err.kind().http_status(), err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> CoreResult<()> {
    let config = CoreConfig::from_env()?;
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(&config.log_level, log_dir)?;
    }
    println!("marketplace_core version={}", core_version());

    let store = match config.db_path.as_deref() {
        Some(path) => SqliteItemStore::open(path),
        None => SqliteItemStore::open_in_memory(),
    }
    .map_err(|err| classify(&err))?;
    let service = ItemService::new(store).with_store_timeout(config.store_timeout);

    walkthrough(&service)?;
    accounts(&config)
}

fn walkthrough<S: ItemStore>(service: &ItemService<S>) -> CoreResult<()> {
    let ids = service.create_many(&[NewItem::new("Example NFT")
        .with_description("This is an example NFT")
        .with_image_url("https://example.com/nft.jpg")
        .with_owner("John Doe")])?;
    println!("created {} item(s): {:?}", ids.len(), ids);

    let items = service.list()?;
    println!("listed {} item(s)", items.len());
    for item in items.iter() {
        println!("  {} {} owner={}", item.id, item.name, item.owner);
    }

    let Some(first) = items.first() else {
        return Ok(());
    };
    let first_id = first.id.to_string();

    service.update(&first_id, &ItemPatch::new().name("Updated NFT Name"))?;
    println!("updated {first_id}: name={}", service.list()?[0].name);

    service.delete(&first_id)?;
    println!("deleted {first_id}; {} item(s) remain", service.list()?.len());
    Ok(())
}

fn accounts(config: &CoreConfig) -> CoreResult<()> {
    let conn = match config.db_path.as_deref() {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    }
    .map_err(|err| classify(&err))?;
    let hasher = Argon2Hasher::from_config(config)
        .map_err(|err| CoreError::validation(err.to_string()))?;
    let service = AccountService::new(SqliteAccountRepository::new(&conn), hasher);

    match service.register(NewAccount::new(
        "newUser",
        "newuser@example.com",
        "password123",
    )) {
        Ok(account) => println!("registered account {} ({})", account.id, account.username),
        Err(err) if err.kind() == ErrorKind::ConstraintViolation => {
            println!("account newUser already registered");
        }
        Err(err) => return Err(err),
    }

    let authenticated = service.authenticate_by_email("newuser@example.com", "password123")?;
    println!(
        "authenticated newuser@example.com: {}",
        authenticated.is_some()
    );
    Ok(())
}
