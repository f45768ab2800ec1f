//! Scenario tests for the decode -> table -> bus pipeline.
//!
//! These drive [`OutputTable`] and [`EventBus`] exactly the way the
//! dispatch thread does, without a live compositor: wire payloads in,
//! subscriber deliveries out.

use riverwatch::bus::EventBus;
use riverwatch::event::{EventFilter, EventKind, StatusEvent};
use riverwatch::state::OutputTable;

fn publish_if(bus: &EventBus, event: Option<StatusEvent>) {
    if let Some(event) = event {
        bus.publish(&event);
    }
}

fn view_tags_payload(bitfields: &[u32]) -> Vec<u8> {
    bitfields.iter().flat_map(|b| b.to_ne_bytes()).collect()
}

#[test]
fn initial_state_reaches_a_filtered_subscriber() {
    let mut table = OutputTable::new();
    let bus = EventBus::new();
    let on_output_7 = bus.subscribe(EventFilter::output(7));

    // Discovery: one output announced, tag sets empty until events arrive.
    table.upsert(7);
    assert!(table.get(7).unwrap().focused_tags.is_empty());

    // Initial focused_tags event after binding.
    publish_if(&bus, table.apply_focused_tags(7, 0b0001));

    assert_eq!(table.get(7).unwrap().focused_tags, vec![0]);
    let delivered = on_output_7.drain();
    assert_eq!(delivered, vec![StatusEvent::FocusedTagsChanged {
        output_id: 7,
        tags: vec![0],
    }]);
}

#[test]
fn view_tags_union_flows_through_to_subscribers() {
    let mut table = OutputTable::new();
    let bus = EventBus::new();
    let views = bus.subscribe(EventFilter::kind(EventKind::ViewTags));

    table.upsert(1);
    publish_if(&bus, table.apply_view_tags(1, &view_tags_payload(&[0b0001, 0b0010])));
    publish_if(&bus, table.apply_view_tags(1, &view_tags_payload(&[])));

    assert_eq!(views.drain(), vec![
        StatusEvent::ViewTagsChanged {
            output_id: 1,
            tags: vec![0, 1],
        },
        StatusEvent::ViewTagsChanged {
            output_id: 1,
            tags: vec![],
        },
    ]);
}

#[test]
fn output_retraction_purges_state_and_notifies_once() {
    let mut table = OutputTable::new();
    let bus = EventBus::new();
    let all = bus.subscribe(EventFilter::all());

    table.upsert(7);
    publish_if(&bus, table.apply_focused_tags(7, 0b0010));
    all.drain();

    // global_remove(7): one removal event, then silence.
    publish_if(&bus, table.remove(7));
    publish_if(&bus, table.remove(7));

    assert!(table.get(7).is_none());
    assert_eq!(all.drain(), vec![StatusEvent::OutputRemoved { output_id: 7 }]);
}

#[test]
fn events_for_a_retracted_output_are_never_published() {
    let mut table = OutputTable::new();
    let bus = EventBus::new();
    let all = bus.subscribe(EventFilter::all());

    table.upsert(3);
    publish_if(&bus, table.remove(3));
    all.drain();

    // A straggler event decoded after the retraction is dropped.
    publish_if(&bus, table.apply_focused_tags(3, 0b0001));
    publish_if(&bus, table.apply_view_tags(3, &view_tags_payload(&[0b0100])));
    publish_if(&bus, table.apply_urgent_tags(3, 0b1000));

    assert!(all.drain().is_empty());
    assert!(table.get(3).is_none());
}

#[test]
fn seat_title_changes_reach_window_subscribers_in_order() {
    let mut table = OutputTable::new();
    let bus = EventBus::new();
    let windows = bus.subscribe(EventFilter::kind(EventKind::ActiveWindow));

    bus.publish(&table.apply_focused_view("vim".to_string()));
    bus.publish(&table.apply_focused_view(String::new()));

    assert_eq!(windows.drain(), vec![
        StatusEvent::ActiveWindowChanged { title: "vim".into() },
        StatusEvent::ActiveWindowChanged { title: "".into() },
    ]);
    assert_eq!(table.seat().active_window_title, "");
}

#[test]
fn multi_output_interleaving_preserves_per_output_order() {
    let mut table = OutputTable::new();
    let bus = EventBus::new();
    let on_a = bus.subscribe(EventFilter::output(10));
    let on_b = bus.subscribe(EventFilter::output(20));

    table.upsert(10);
    table.upsert(20);

    publish_if(&bus, table.apply_focused_tags(10, 0b0001));
    publish_if(&bus, table.apply_focused_tags(20, 0b0010));
    publish_if(&bus, table.apply_focused_tags(10, 0b0100));
    publish_if(&bus, table.apply_focused_tags(20, 0b1000));

    let tags_of = |events: Vec<StatusEvent>| -> Vec<Vec<u8>> {
        events
            .into_iter()
            .map(|e| match e {
                StatusEvent::FocusedTagsChanged { tags, .. } => tags,
                other => panic!("unexpected event {other:?}"),
            })
            .collect()
    };

    assert_eq!(tags_of(on_a.drain()), vec![vec![0], vec![2]]);
    assert_eq!(tags_of(on_b.drain()), vec![vec![1], vec![3]]);
}
