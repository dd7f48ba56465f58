use super::*;
use crate::foundation::clock::ManualClock;
use crate::scene::canvas::Canvas;
use crate::scene::drawable::Tags;

fn manager() -> (Rc<ManualClock>, MemoryManager) {
    let clock = Rc::new(ManualClock::new(0.0));
    let mm = MemoryManager::new(clock.clone());
    (clock, mm)
}

fn node(id: u64, kind: PrimitiveKind) -> Drawable {
    Drawable::new(DrawableId(id), kind)
}

/// Two sections: 1 -> [2 -> [3]], 10 -> [11].
fn scene() -> Canvas {
    let mut c = Canvas::new(400.0, 400.0);
    let mut s1 = node(1, PrimitiveKind::Group);
    let mut comp = node(2, PrimitiveKind::Group);
    comp.children.push(node(3, PrimitiveKind::Rect));
    s1.children.push(comp);
    let mut s2 = node(10, PrimitiveKind::Group);
    s2.children.push(node(11, PrimitiveKind::Text));
    c.add_section(s1);
    c.add_section(s2);
    c
}

fn register_scene(mm: &mut MemoryManager, c: &Canvas) {
    for root in c.content() {
        mm.register_tree(root);
    }
}

#[test]
fn register_then_unregister_keeps_count() {
    let (_clock, mut mm) = manager();
    mm.register_object(&node(1, PrimitiveKind::Rect));
    let before = mm.get_stats().object_count;
    let d = node(2, PrimitiveKind::Rect);
    mm.register_object(&d);
    assert!(mm.unregister_object(d.id));
    assert_eq!(mm.get_stats().object_count, before);
    assert!(!mm.unregister_object(d.id));
    assert_eq!(mm.get_stats().object_count, before);
}

#[test]
fn pool_retains_at_most_max_size() {
    let (_clock, mut mm) = manager();
    mm.initialize_pool(PrimitiveKind::Rect, PoolOpts { max_size: 2 });
    for id in 1..=3 {
        mm.release(node(id, PrimitiveKind::Rect));
    }
    let st = mm.pool_stats(PrimitiveKind::Rect).unwrap();
    assert_eq!(st.pooled, 2);
    assert_eq!(st.disposed, 1);

    assert!(mm.acquire(PrimitiveKind::Rect).is_some());
    assert!(mm.acquire(PrimitiveKind::Rect).is_some());
    assert!(mm.acquire(PrimitiveKind::Rect).is_none());
    let st = mm.pool_stats(PrimitiveKind::Rect).unwrap();
    assert_eq!(st.acquire_hits, 2);
    assert_eq!(st.acquire_misses, 1);
}

#[test]
fn acquire_without_pool_returns_none() {
    let (_clock, mut mm) = manager();
    assert!(!mm.has_pool(PrimitiveKind::Ellipse));
    assert!(mm.acquire(PrimitiveKind::Ellipse).is_none());
    mm.release(node(5, PrimitiveKind::Ellipse));
    assert_eq!(mm.get_stats().inactive_pool_size, 0);
}

#[test]
fn acquired_objects_come_back_reset_and_active() {
    let (clock, mut mm) = manager();
    mm.initialize_pool(PrimitiveKind::Text, PoolOpts::default());
    let mut t = node(7, PrimitiveKind::Text);
    t.text.push_str("hello");
    t.owner.push_str("c1");
    mm.release(t);
    clock.set(42.0);
    let got = mm.acquire(PrimitiveKind::Text).unwrap();
    assert_eq!(got.state, crate::memory::pool::PoolState::Active);
    assert_eq!(got.last_accessed, 42.0);
    assert!(got.drawable.text.is_empty());
    assert!(got.drawable.owner.is_empty());
}

#[test]
fn releasing_a_group_pools_its_children_too() {
    let (_clock, mut mm) = manager();
    for k in PrimitiveKind::ALL {
        mm.initialize_pool(k, PoolOpts::default());
    }
    let c = scene();
    register_scene(&mut mm, &c);
    let mut c = c;
    let roots = c.take_content();
    for r in roots {
        mm.unregister_tree(&r);
        mm.release(r);
    }
    let st = mm.get_stats();
    assert_eq!(st.object_count, 0);
    assert_eq!(st.inactive_pool_size, 5);
    assert_eq!(mm.pool_stats(PrimitiveKind::Group).unwrap().pooled, 3);
}

#[test]
fn releasing_a_registered_node_unregisters_it() {
    let (_clock, mut mm) = manager();
    let d = node(3, PrimitiveKind::Rect);
    mm.register_object(&d);
    mm.release(d);
    assert_eq!(mm.object_count(), 0);
}

#[test]
fn live_plus_pooled_is_bounded() {
    let (_clock, mut mm) = manager();
    let max = 3;
    mm.initialize_pool(PrimitiveKind::Rect, PoolOpts { max_size: max });
    let mut live = Vec::new();
    for id in 0..10 {
        let d = node(id, PrimitiveKind::Rect);
        mm.register_object(&d);
        live.push(d);
    }
    while let Some(d) = live.pop() {
        mm.unregister_object(d.id);
        mm.release(d);
        let st = mm.pool_stats(PrimitiveKind::Rect).unwrap();
        assert!(st.live + st.pooled <= max + st.live);
        assert!(st.pooled <= max);
    }
}

#[test]
fn gc_never_evicts_recently_accessed_objects() {
    let (clock, mut mm) = manager();
    let mut c = scene();
    register_scene(&mut mm, &c);

    clock.set(50.0);
    mm.mark_accessed(DrawableId(3));
    clock.set(120.0);

    let report = mm.force_gc(&mut c, 100.0, &HashSet::new());
    // Section 1 holds a fresh descendant; section 2 is entirely stale.
    assert_eq!(report.evicted, vec![DrawableId(10)]);
    assert_eq!(report.unregistered, 2);
    assert!(mm.is_registered(DrawableId(3)));
    assert!(mm.is_registered(DrawableId(1)));
    assert!(c.find(DrawableId(10)).is_none());
    assert_eq!(mm.object_count(), 3);
    assert_eq!(mm.get_stats().gc_runs, 1);
}

#[test]
fn gc_evicts_all_eligible_in_one_pass() {
    let (clock, mut mm) = manager();
    let mut c = scene();
    register_scene(&mut mm, &c);
    clock.set(1_000.0);
    let report = mm.force_gc(&mut c, 100.0, &HashSet::new());
    assert_eq!(report.evicted, vec![DrawableId(1), DrawableId(10)]);
    assert_eq!(mm.object_count(), 0);
    assert!(c.content().is_empty());
}

#[test]
fn gc_respects_protected_set_and_grid() {
    let (clock, mut mm) = manager();
    let mut c = scene();
    let mut g = node(50, PrimitiveKind::Line);
    g.tags = Tags::GRID;
    mm.register_object(&g);
    c.set_grid(vec![g]);
    register_scene(&mut mm, &c);
    clock.set(1_000.0);

    let protected: HashSet<DrawableId> = [DrawableId(11)].into_iter().collect();
    let report = mm.force_gc(&mut c, 100.0, &protected);
    assert_eq!(report.evicted, vec![DrawableId(1)]);
    assert!(mm.is_registered(DrawableId(50)));
    assert!(mm.is_registered(DrawableId(10)));
    assert!(mm.is_registered(DrawableId(11)));
}

#[test]
fn gc_drops_orphaned_entries() {
    let (clock, mut mm) = manager();
    let mut c = Canvas::new(10.0, 10.0);
    mm.register_object(&node(99, PrimitiveKind::Rect));
    clock.set(500.0);
    let report = mm.force_gc(&mut c, 10.0, &HashSet::new());
    assert_eq!(report.orphans_dropped, 1);
    assert_eq!(mm.object_count(), 0);
}

#[test]
fn stats_are_recomputed_from_registry_and_pools() {
    let (clock, mut mm) = manager();
    mm.initialize_pool(PrimitiveKind::Rect, PoolOpts::default());
    let mut t = node(1, PrimitiveKind::Text);
    t.text.push_str("abcd");
    mm.register_object(&t);
    mm.register_object(&node(2, PrimitiveKind::Rect));
    mm.release(node(3, PrimitiveKind::Rect));
    clock.set(7.0);

    let st = mm.get_stats();
    assert_eq!(st.object_count, 2);
    assert_eq!(st.active_pool_size, 1);
    assert_eq!(st.inactive_pool_size, 1);
    assert_eq!(
        st.estimated_memory_usage,
        estimated_cost(PrimitiveKind::Text, 4, 0)
            + estimated_cost(PrimitiveKind::Rect, 0, 0)
            + estimated_cost(PrimitiveKind::Rect, 0, 0)
    );
    assert_eq!(st.timestamp, 7.0);
}

#[test]
fn drain_all_empties_everything() {
    let (_clock, mut mm) = manager();
    mm.initialize_pool(PrimitiveKind::Rect, PoolOpts::default());
    mm.register_object(&node(1, PrimitiveKind::Rect));
    mm.release(node(2, PrimitiveKind::Rect));
    assert_eq!(mm.drain_all(), 1);
    let st = mm.get_stats();
    assert_eq!(st.object_count, 0);
    assert_eq!(st.inactive_pool_size, 0);
}
