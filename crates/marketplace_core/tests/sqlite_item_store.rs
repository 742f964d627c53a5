use marketplace_core::{
    classify, Assigner, ErrorKind, ItemPatch, ItemService, ItemStore, NewItem, OpContext,
    SqliteItemStore, SystemAssigner,
};
use rusqlite::Connection;
use uuid::Uuid;

#[test]
fn items_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("items.db");

    let ids = {
        let service = ItemService::new(SqliteItemStore::open(&path).unwrap());
        let ids = service
            .create_many(&[
                NewItem::new("Example NFT")
                    .with_description("This is an example NFT")
                    .with_image_url("https://example.com/nft.jpg")
                    .with_owner("John Doe"),
                NewItem::new("Second"),
            ])
            .unwrap();
        service
            .update(&ids[1].to_string(), &ItemPatch::new().owner("Jane"))
            .unwrap();
        ids
    };

    let service = ItemService::new(SqliteItemStore::open(&path).unwrap());
    let listed = service.list().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, ids[0]);
    assert_eq!(listed[0].image_url, "https://example.com/nft.jpg");
    assert_eq!(listed[1].id, ids[1]);
    assert_eq!(listed[1].owner, "Jane");
}

#[test]
fn delete_and_update_of_missing_rows_report_not_found() {
    let store = SqliteItemStore::open_in_memory().unwrap();
    let ctx = OpContext::background();
    let missing = Uuid::new_v4();

    let err = store.delete_one(&ctx, missing).unwrap_err();
    assert_eq!(classify(&err).kind(), ErrorKind::NotFound);

    let err = store
        .update_one(&ctx, missing, &ItemPatch::new().name("x"))
        .unwrap_err();
    assert_eq!(classify(&err).kind(), ErrorKind::NotFound);
}

#[test]
fn cancelled_context_stops_store_before_io() {
    let store = SqliteItemStore::open_in_memory().unwrap();
    let ctx = OpContext::background();
    ctx.cancel();

    let item = SystemAssigner.assign(&NewItem::new("A"));
    let err = store.insert_many(&ctx, &[item]).unwrap_err();
    assert_eq!(classify(&err).kind(), ErrorKind::Connectivity);
    assert!(store.find_all(&OpContext::background()).unwrap().is_empty());
}

#[test]
fn corrupted_document_is_reported_as_unknown() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("items.db");
    let store = SqliteItemStore::open(&path).unwrap();
    store
        .insert_many(
            &OpContext::background(),
            &[SystemAssigner.assign(&NewItem::new("A"))],
        )
        .unwrap();

    let conn = Connection::open(&path).unwrap();
    conn.execute("UPDATE items SET document = '{not json';", [])
        .unwrap();
    drop(conn);

    let err = store.find_all(&OpContext::background()).unwrap_err();
    assert_eq!(classify(&err).kind(), ErrorKind::Unknown);
}
