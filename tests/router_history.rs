use folio_wasm::registry::{Project, ProjectRegistry};
use folio_wasm::route::{BasePath, Dispatch, MemoryHistory, Route, Router};
use folio_wasm::Error;

fn registry() -> ProjectRegistry {
    ProjectRegistry::new(vec![
        Project::new("lumen", "Lumen"),
        Project::new("tide", "Tide"),
        Project::new("", "Open Field"),
    ])
    .unwrap()
}

#[test]
fn back_and_forward_replay_without_pushing() {
    let registry = registry();
    let mut router = Router::new(BasePath::default(), MemoryHistory::new("/"), "/");

    router.navigate("/work/lumen/", &registry).unwrap();
    router.navigate("/work/tide/", &registry).unwrap();
    assert_eq!(router.history().pushes(), 2);

    let location = router.history_mut().back().unwrap();
    let dispatch = router.pop(&location, &registry).unwrap();
    assert!(matches!(dispatch, Dispatch::Project { ref slug, .. } if slug == "lumen"));

    let location = router.history_mut().back().unwrap();
    let dispatch = router.pop(&location, &registry).unwrap();
    assert!(matches!(dispatch, Dispatch::Home { .. }));
    assert_eq!(router.current(), &Route::Home);

    let location = router.history_mut().forward().unwrap();
    router.pop(&location, &registry).unwrap();
    assert_eq!(router.current(), &Route::Project("lumen".into()));

    assert_eq!(router.history().pushes(), 2);
    assert_eq!(router.history().len(), 3);
}

#[test]
fn navigating_after_back_drops_forward_entries() {
    let registry = registry();
    let mut router = Router::new(BasePath::default(), MemoryHistory::new("/"), "/");
    router.navigate("/work/lumen/", &registry).unwrap();
    router.navigate("/work/tide/", &registry).unwrap();

    let location = router.history_mut().back().unwrap();
    router.pop(&location, &registry).unwrap();
    router.navigate("/work/open-field/", &registry).unwrap();

    assert_eq!(router.history().location(), "/work/open-field/");
    assert!(router.history_mut().forward().is_none());
}

#[test]
fn rejected_paths_leave_history_alone() {
    let registry = registry();
    let mut router = Router::new(BasePath::new("/site"), MemoryHistory::new("/site/"), "/site/");

    assert!(matches!(
        router.navigate("/site/work/missing/", &registry),
        Err(Error::ProjectNotFound(_))
    ));
    assert!(matches!(
        router.navigate("/site/about/", &registry),
        Err(Error::UnknownRoute(_))
    ));
    assert_eq!(router.history().pushes(), 0);
    assert_eq!(router.current(), &Route::Home);
}

#[test]
fn only_latest_ticket_may_render() {
    let registry = registry();
    let mut router = Router::new(BasePath::default(), MemoryHistory::new("/"), "/");

    let slow = router.navigate("/work/lumen/", &registry).unwrap().ticket();
    let fast = router.navigate("/work/tide/", &registry).unwrap().ticket();
    assert!(!router.is_current(slow));
    assert!(router.is_current(fast));

    // A failed navigation does not invalidate the one in flight.
    let _ = router.navigate("/work/missing/", &registry);
    assert!(router.is_current(fast));
}
