// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod server;

pub use server::{MockApi, RecordedRequest};

use serde_json::{Value, json};
use std::collections::{BTreeMap, BTreeSet};
use time::format_description::well_known::Rfc3339;
use time::{Date, Duration, Month, OffsetDateTime, Time};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const DEMO_INSTALL_TOKEN: &str = "demo-token";

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];
const SEGMENTS: [&str; 6] = ["vip", "new", "churn-risk", "newsletter", "mobile", "returning"];
const EVENT_TYPES: [&str; 8] = [
    "page-view",
    "add-to-cart",
    "checkout",
    "purchase",
    "sign-up",
    "login",
    "search",
    "identify",
];
const JOURNEY_STATES: [&str; 5] = ["awareness", "consideration", "purchase", "retention", "loyalty"];
const BROWSERS: [&str; 4] = ["Firefox", "Chrome", "Safari", "Edge"];
const PAGES: [&str; 8] = [
    "/", "/pricing", "/docs", "/blog", "/cart", "/checkout", "/account", "/search",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Generates profile, session, and event records shaped like the platform's.
#[derive(Debug, Clone)]
pub struct RecordFaker {
    rng: DeterministicRng,
    clock: OffsetDateTime,
}

impl RecordFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            clock: reference_now(),
        }
    }

    pub fn profile(&mut self, index: usize) -> Value {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let inserted = self.tick();
        let segment_count = self.rng.int_n(3);
        let segments: Vec<&str> = (0..segment_count).map(|_| self.pick(&SEGMENTS)).collect();
        json!({
            "id": format!("profile-{index:04}"),
            "metadata": {
                "time": {
                    "insert": format_time(inserted),
                    "visit": {"count": self.rng.int_n(40) + 1},
                },
            },
            "active": self.rng.bool(),
            "segments": segments,
            "data": {
                "pii": {
                    "firstname": first,
                    "lastname": last,
                    "email": format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase()),
                },
                "devices": {"last": {"browser": self.pick(&BROWSERS)}},
            },
            "traits": {"journey": self.pick(&JOURNEY_STATES)},
        })
    }

    pub fn session(&mut self, index: usize, profile_id: &str) -> Value {
        let started = self.tick();
        json!({
            "id": format!("session-{index:04}"),
            "profile": {"id": profile_id},
            "metadata": {"time": {"insert": format_time(started)}},
            "context": {"browser": {"name": self.pick(&BROWSERS)}},
        })
    }

    pub fn event(&mut self, index: usize, profile_id: &str, session_id: &str) -> Value {
        let at = self.tick();
        json!({
            "id": format!("event-{index:05}"),
            "type": self.pick(&EVENT_TYPES),
            "metadata": {
                "time": {"insert": format_time(at)},
                "valid": self.rng.int_n(10) != 0,
            },
            "journey": {"state": self.pick(&JOURNEY_STATES)},
            "profile": {"id": profile_id},
            "session": {"id": session_id},
            "properties": {"page": self.pick(&PAGES)},
        })
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn tick(&mut self) -> OffsetDateTime {
        let step = i64::try_from(self.rng.int_n(600)).unwrap_or(0) + 1;
        self.clock += Duration::seconds(step);
        self.clock
    }
}

fn format_time(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_default()
}

/// Everything the mock API serves.
#[derive(Debug, Clone, Default)]
pub struct Fixtures {
    pub page_size: usize,
    pub collections: BTreeMap<String, Vec<Value>>,
    pub forms: BTreeMap<String, FormFixture>,
    pub resources: Vec<Value>,
    pub install_token: String,
    /// Collections that answer every page request with a 502.
    pub failing: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormFixture {
    pub schema: Value,
    pub values: Value,
}

impl Fixtures {
    pub fn empty() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            install_token: DEMO_INSTALL_TOKEN.to_owned(),
            ..Self::default()
        }
    }

    pub fn demo() -> Self {
        let mut faker = RecordFaker::new(7);
        let profiles: Vec<Value> = (0..45).map(|index| faker.profile(index)).collect();

        let mut sessions = Vec::new();
        let mut events = Vec::new();
        for (index, profile) in profiles.iter().enumerate().take(30) {
            let profile_id = profile["id"].as_str().unwrap_or_default().to_owned();
            let session = faker.session(index, &profile_id);
            let session_id = session["id"].as_str().unwrap_or_default().to_owned();
            for _ in 0..3 {
                events.push(faker.event(events.len(), &profile_id, &session_id));
            }
            sessions.push(session);
        }

        let mut fixtures = Self::empty();
        fixtures.with_collection("profiles", profiles);
        fixtures.with_collection("sessions", sessions);
        fixtures.with_collection("events", events);
        fixtures.forms.insert(
            "copy-trait".to_owned(),
            FormFixture {
                schema: plugin_form_schema(),
                values: json!({
                    "source": "event@properties.page",
                    "target": "profile@traits.last_page",
                    "retries": 3,
                }),
            },
        );
        fixtures.resources = vec![
            json!({"id": "res-mailchimp", "name": "Mailchimp"}),
            json!({"id": "res-webhook", "name": "Webhook"}),
            json!({"id": "res-broken"}),
        ];
        fixtures
    }

    pub fn with_collection(&mut self, name: &str, rows: Vec<Value>) -> &mut Self {
        self.collections.insert(name.to_owned(), rows);
        self
    }
}

/// A form that exercises every component kind plus one unknown kind.
pub fn plugin_form_schema() -> Value {
    json!({
        "title": "Copy trait",
        "groups": [
            {
                "name": "Mapping",
                "description": "Copy a value from the event into the profile.",
                "fields": [
                    {
                        "id": "source",
                        "name": "Source path",
                        "description": "Where to read the value.",
                        "component": {"type": "dotPath", "props": {"label": "Source"}}
                    },
                    {
                        "id": "target",
                        "name": "Target path",
                        "component": {"type": "dotPath", "props": {"label": "Target"}}
                    }
                ]
            },
            {
                "name": "Delivery",
                "fields": [
                    {"id": "retries", "name": "Retries", "component": {"type": "number"}},
                    {"id": "resource", "name": "Resource", "component": {"type": "resources"}},
                    {"id": "note", "name": "Note", "component": {"type": "textarea"}},
                    {"id": "label", "name": "Label", "component": {"type": "text"}},
                    {"id": "chart", "name": "Chart", "component": {"type": "sparkline"}}
                ]
            }
        ]
    })
}

fn reference_now() -> OffsetDateTime {
    Date::from_calendar_date(2026, Month::February, 19)
        .map(|date| date.with_time(Time::MIDNIGHT).assume_utc())
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}
