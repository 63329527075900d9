use tutordeskd::cache::SessionCache;
use tutordeskd::db::open_in_memory;
use tutordeskd::facade;
use tutordeskd::store;

#[test]
fn saving_branding_twice_keeps_a_single_row() {
    let conn = open_in_memory().unwrap();
    let mut cache = SessionCache::new();

    let logo = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 7];
    facade::save_branding(
        &conn,
        &mut cache,
        Some(logo.clone()),
        Some("Benvenuti!".to_string()),
    )
    .unwrap();

    let branding = cache.branding.as_ref().expect("branding stored");
    assert_eq!(branding.logo.as_deref(), Some(logo.as_slice()));
    assert_eq!(branding.welcome_message.as_deref(), Some("Benvenuti!"));

    // Second save updates in place instead of adding a row.
    facade::save_branding(&conn, &mut cache, None, Some("Ciao a tutti".to_string())).unwrap();
    assert_eq!(store::count(&conn, "branding_settings").unwrap(), 1);

    let branding = cache.branding.as_ref().expect("branding stored");
    assert!(branding.logo.is_none());
    assert_eq!(branding.welcome_message.as_deref(), Some("Ciao a tutti"));
}

#[test]
fn branding_starts_absent() {
    let conn = open_in_memory().unwrap();
    let mut cache = SessionCache::new();
    cache.reload(&conn).unwrap();
    assert!(cache.branding.is_none());
}
