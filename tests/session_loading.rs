use std::collections::HashMap;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokenscope::{
    DatasetLoader, DatasetSchema, Facet, LoadError, LoadOutcome, ResourceSource, Session,
    SortDirection,
};

const SLOW: &str = r#"[
    {"text_id":"s1","tokens":["slow"],"firing_magnitudes":[1],"group":"news"}
]"#;

const FAST: &str = r#"[
    {"text_id":"f1","tokens":["fast"],"firing_magnitudes":[2],"group":"blog"},
    {"text_id":"f2","tokens":["faster"],"firing_magnitudes":[7],"group":"news"}
]"#;

/// Serves fixed payloads; `slow.json` blocks until the test releases it.
struct GatedSource {
    payloads: HashMap<String, &'static str>,
    gate: Mutex<Receiver<()>>,
}

impl GatedSource {
    fn new() -> (Self, Sender<()>) {
        let (tx, rx) = channel();
        let payloads = HashMap::from([
            ("slow.json".to_string(), SLOW),
            ("fast.json".to_string(), FAST),
            ("broken.json".to_string(), "[{\"text_id\": "),
        ]);
        (
            Self {
                payloads,
                gate: Mutex::new(rx),
            },
            tx,
        )
    }
}

impl ResourceSource for GatedSource {
    fn id(&self) -> &str {
        "gated"
    }

    fn fetch(&self, resource: &str) -> Result<Vec<u8>, LoadError> {
        if resource == "slow.json" {
            let gate = self.gate.lock().expect("gate poisoned");
            gate.recv_timeout(Duration::from_secs(10))
                .map_err(|_| LoadError::Fetch {
                    resource: resource.to_string(),
                    reason: "gate never opened".into(),
                })?;
        }
        self.payloads
            .get(resource)
            .map(|payload| payload.as_bytes().to_vec())
            .ok_or_else(|| LoadError::Fetch {
                resource: resource.to_string(),
                reason: "unknown".into(),
            })
    }
}

fn session() -> (Session, Sender<()>) {
    let (source, gate) = GatedSource::new();
    let loader = DatasetLoader::new(
        Arc::new(source),
        DatasetSchema::grouped().with_resource_suffix(".json"),
    );
    (Session::new(loader), gate)
}

#[test]
fn slow_earlier_load_cannot_replace_newer_dataset() {
    let (session, gate) = session();

    let slow = session.load_in_background("slow");
    let fast = session.load_in_background("fast");
    let fast_outcome = fast.wait();
    assert_eq!(
        fast_outcome,
        LoadOutcome::Applied {
            generation: 2,
            records: 2
        }
    );

    gate.send(()).unwrap();
    assert_eq!(
        slow.wait(),
        LoadOutcome::Superseded {
            generation: 1,
            latest: 2
        }
    );

    let dataset = session.dataset();
    assert_eq!(dataset.id, "fast");
    assert_eq!(session.applied_generation(), 2);
    let ids: Vec<String> = session.view().into_iter().map(|record| record.id).collect();
    assert_eq!(ids, ["f2", "f1"]);
}

#[test]
fn stale_failure_does_not_clear_current_dataset() {
    let (session, _gate) = session();
    let stale = session.begin_load("slow");
    assert!(session.load("fast").is_applied());

    let outcome = session.finish_load(
        stale,
        Err(LoadError::Fetch {
            resource: "slow.json".into(),
            reason: "timed out".into(),
        }),
    );
    assert!(matches!(outcome, LoadOutcome::Superseded { .. }));
    assert_eq!(session.dataset().len(), 2);
    assert!(session.last_error().is_none());
}

#[test]
fn failed_load_shows_empty_dataset_and_controls_keep_working() {
    let (session, _gate) = session();
    assert!(session.load("fast").is_applied());

    let outcome = session.load("broken");
    assert!(matches!(outcome, LoadOutcome::Failed(LoadError::Parse { .. })));
    assert!(session.dataset().is_empty());
    assert!(session.facets().is_empty());
    assert!(matches!(session.last_error(), Some(LoadError::Parse { .. })));

    session.select(Facet::Group, "news").unwrap();
    session.set_direction(SortDirection::Ascending);
    assert!(session.view().is_empty());
    assert!(session.distribution(Facet::Group).is_none());
}

#[test]
fn applied_load_resets_filters_but_keeps_direction() {
    let (session, _gate) = session();
    assert!(session.load("fast").is_applied());
    session.select(Facet::Group, "news").unwrap();
    session.set_direction(SortDirection::Ascending);
    assert_eq!(session.view().len(), 1);

    assert!(session.load("fast").is_applied());
    let selection = session.selection();
    assert!(selection.filter.is_unconstrained());
    assert_eq!(selection.direction, SortDirection::Ascending);
    let ids: Vec<String> = session.view().into_iter().map(|record| record.id).collect();
    assert_eq!(ids, ["f1", "f2"]);
}

#[test]
fn facet_index_tracks_applied_dataset() {
    let (session, _gate) = session();
    assert!(session.load("fast").is_applied());
    let facets = session.facets();
    let groups: Vec<String> = facets
        .values(Facet::Group)
        .iter()
        .map(|value| value.to_string())
        .collect();
    assert_eq!(groups, ["blog", "news"]);

    let distribution = session.distribution(Facet::Group).unwrap();
    assert_eq!(distribution.total, 2);
    assert_eq!(distribution.distinct, 2);
}
