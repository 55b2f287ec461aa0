use throbber::prelude::*;
use throbber::platform::NodeId;

struct Page {
    doc: MemoryDocument,
    clock: ManualClock,
    before: NodeId,
    target: NodeId,
    after: NodeId,
}

fn page() -> Page {
    let _ = env_logger::builder().is_test(true).try_init();

    let doc = MemoryDocument::new();
    let root = doc.root();
    let before = doc.create_element("p");
    let target = doc.create_element("div");
    let after = doc.create_element("p");
    for node in [before, target, after] {
        doc.append_child(&root, &node).unwrap();
    }
    Page {
        doc,
        clock: ManualClock::new(5_000.0),
        before,
        target,
        after,
    }
}

fn spinner(page: &Page, config: SpinnerConfig) -> Spinner<MemoryDocument, RecordingSurface> {
    Spinner::with_config(page.doc.clone(), RecordingSurface::new(), config)
        .unwrap()
        .with_clock(page.clock.clone())
        .with_rng_seed(11)
}

#[test]
fn test_attach_detach_round_trip_restores_position() {
    let page = page();
    let mut spinner = spinner(&page, SpinnerConfig::default());
    let root = page.doc.root();

    spinner.attach(Some(page.target)).unwrap();
    assert_eq!(
        page.doc.children(root),
        vec![page.before, *spinner.container(), page.after]
    );

    assert_eq!(spinner.detach(), Some(page.target));
    assert_eq!(
        page.doc.children(root),
        vec![page.before, page.target, page.after]
    );
    assert_eq!(spinner.state(), PlaybackState::Detached);
}

#[test]
fn test_detach_twice_is_a_noop() {
    let page = page();
    let mut spinner = spinner(&page, SpinnerConfig::default());
    spinner.attach(Some(page.target)).unwrap();
    spinner.update();
    assert!(spinner.is_playing());

    assert_eq!(spinner.detach(), Some(page.target));
    let children = page.doc.children(page.doc.root());
    assert_eq!(spinner.detach(), None);
    assert_eq!(page.doc.children(page.doc.root()), children);
    assert_eq!(spinner.state(), PlaybackState::Detached);
    assert_eq!(page.doc.observer_count(), 0);
}

#[test]
fn test_stop_twice_is_a_noop() {
    let page = page();
    let mut spinner = spinner(&page, SpinnerConfig::default().autostart(false));
    spinner.attach(Some(page.target)).unwrap();
    spinner.play().unwrap();
    page.clock.advance(120.0);

    spinner.pause();
    let frame = spinner.frame();
    page.clock.advance(500.0);
    spinner.pause();
    assert_eq!(spinner.state(), PlaybackState::Paused);
    assert_eq!(spinner.frame(), frame);
}

#[test]
fn test_nodes_are_reused_across_cycles() {
    let page = page();
    let mut spinner = spinner(&page, SpinnerConfig::default());
    let container = *spinner.container();
    let canvas = *spinner.canvas();

    for _ in 0..3 {
        spinner.attach(Some(page.target)).unwrap();
        spinner.update();
        spinner.detach();
    }
    assert_eq!(*spinner.container(), container);
    assert_eq!(*spinner.canvas(), canvas);
    assert_eq!(page.doc.parent_of(&canvas), Some(container));
}

#[test]
fn test_reattach_elsewhere_restores_first_target() {
    let page = page();
    let mut spinner = spinner(&page, SpinnerConfig::default().autostart(false));
    spinner.attach(Some(page.target)).unwrap();
    spinner.attach(Some(page.after)).unwrap();

    let root = page.doc.root();
    assert_eq!(
        page.doc.children(root),
        vec![page.before, page.target, *spinner.container()]
    );
    assert_eq!(spinner.insertion_point(), Some(&page.after));
}

#[test]
fn test_start_while_detached_reattaches_at_last_point() {
    let page = page();
    let mut spinner = spinner(&page, SpinnerConfig::default().autostart(false));
    spinner.attach(Some(page.target)).unwrap();
    spinner.detach();

    spinner.animate().unwrap();
    assert!(spinner.is_playing());
    assert_eq!(page.doc.index_in_parent(*spinner.container()), Some(1));
}

#[test]
fn test_forced_removal_then_explicit_detach() {
    let page = page();
    let mut spinner = spinner(&page, SpinnerConfig::default());
    spinner.attach(Some(page.target)).unwrap();
    spinner.update();

    page.doc.remove(*spinner.container()).unwrap();
    // Explicit detach wins the race; the container is gone so nothing is restored
    assert_eq!(spinner.detach(), None);
    assert_eq!(spinner.state(), PlaybackState::Detached);
    // The removal notification finds nothing left to do
    assert_eq!(spinner.update(), None);
    assert_eq!(spinner.state(), PlaybackState::Detached);
}

#[test]
fn test_forced_removal_stops_drawing() {
    let page = page();
    let mut spinner = spinner(&page, SpinnerConfig::default());
    spinner.attach(Some(page.target)).unwrap();
    spinner.update();

    page.doc.remove(*spinner.container()).unwrap();
    assert_eq!(spinner.update(), None);
    spinner.surface_mut().clear_log();

    page.clock.advance(1_000.0);
    assert_eq!(spinner.update(), None);
    assert_eq!(spinner.surface().pass_count(), 0);
}

#[test]
fn test_forced_removal_of_ancestor_detaches() {
    let page = page();
    let wrapper = page.doc.create_element("section");
    let inner = page.doc.create_element("div");
    page.doc.append_child(&page.doc.root(), &wrapper).unwrap();
    page.doc.append_child(&wrapper, &inner).unwrap();

    let mut spinner = spinner(&page, SpinnerConfig::default());
    spinner.attach(Some(inner)).unwrap();
    page.doc.remove(wrapper).unwrap();
    spinner.update();
    assert_eq!(spinner.state(), PlaybackState::Detached);
}

#[test]
fn test_timer_keeps_pace_with_wall_clock() {
    let page = page();
    let mut spinner = spinner(&page, SpinnerConfig::default().autostart(false));
    spinner.attach(Some(page.target)).unwrap();
    spinner.start().unwrap();
    let delay = spinner.frame_delay();

    // A host that wakes far too late lands on the due frame directly
    page.clock.advance(delay * 7.0);
    spinner.surface_mut().clear_log();
    let wait = spinner.update().unwrap();
    assert_eq!(spinner.surface().pass_count(), 1);
    assert!((spinner.frame() - 7.0).abs() < 1e-9);
    assert!((wait.as_secs_f64() * 1000.0 - delay).abs() < 1e-6);
}
