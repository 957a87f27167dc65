use chorale_codec::{ConversionPipeline, Role, RoleClassifier};
use chorale_domain::{
    DurationType, Pitch, ScoreItem, SourceElement, SourceKey, SourceMeasure, SourcePart,
    SourceScore, StaffOnsets, Step, SymbolicDuration, Tie, TieType, TimeSignature,
};

fn note(step: Step, alter: i8, octave: i8, quarter_length: f64) -> SourceElement {
    SourceElement::Note {
        pitch: Pitch::new(step, alter, octave),
        quarter_length,
        tie: None,
    }
}

fn measure(elements: Vec<SourceElement>) -> SourceMeasure {
    SourceMeasure {
        elements,
        ..SourceMeasure::default()
    }
}

/// One 4/4 measure in G major, four named voices.
fn chorale_bar() -> SourceScore {
    let mut soprano = measure(vec![
        note(Step::B, 0, 4, 1.0),
        note(Step::A, 0, 4, 0.5),
        note(Step::G, 0, 4, 0.5),
        SourceElement::Note {
            pitch: Pitch::new(Step::D, 0, 5),
            quarter_length: 2.0,
            tie: Some(TieType::Start),
        },
    ]);
    soprano.key = Some(SourceKey {
        sharps: 1,
        mode: None,
    });
    soprano.time = Some(TimeSignature::common());
    SourceScore::new(vec![
        SourcePart::named("Soprano", vec![soprano]),
        SourcePart::named("Alto", vec![measure(vec![note(Step::G, 0, 4, 2.0), note(Step::F, 1, 4, 2.0)])]),
        SourcePart::named("Tenor", vec![measure(vec![note(Step::D, 0, 4, 4.0)])]),
        SourcePart::named("Bass", vec![measure(vec![note(Step::G, 0, 3, 3.0), SourceElement::Rest { quarter_length: 1.0 }])]),
    ])
}

#[test]
fn soprano_voice_matches_expected_symbols() {
    let conversion = ConversionPipeline::new().convert(&chorale_bar()).unwrap();
    let doc = &conversion.score;
    assert_eq!(doc.meta.key.as_deref(), Some("G"));
    assert_eq!(doc.meta.time.to_string(), "4/4");

    let soprano = &doc.measures[0].staves.treble.voices[0].items;
    assert_eq!(
        soprano,
        &vec![
            ScoreItem::note(Pitch::new(Step::B, 0, 4), SymbolicDuration::plain(DurationType::Quarter)),
            ScoreItem::note(Pitch::new(Step::A, 0, 4), SymbolicDuration::plain(DurationType::Eighth)),
            ScoreItem::note(Pitch::new(Step::G, 0, 4), SymbolicDuration::plain(DurationType::Eighth)),
            ScoreItem::Note {
                pitch: Pitch::new(Step::D, 0, 5),
                duration: SymbolicDuration::plain(DurationType::Half),
                tie: Tie::new(true, false),
            },
        ]
    );
    let bass = &doc.measures[0].staves.bass.voices[1].items;
    assert_eq!(bass[0].duration(), SymbolicDuration::dotted(DurationType::Half));
    assert_eq!(bass[1], ScoreItem::rest(SymbolicDuration::plain(DurationType::Quarter)));
}

#[test]
fn chorale_events_merge_voices_per_staff() {
    let events = ConversionPipeline::new().convert(&chorale_bar()).unwrap().events;
    let starts: Vec<u64> = events.iter().map(|e| e.start).collect();
    assert_eq!(starts, vec![0, 480, 720, 960]);
    assert_eq!(events[0].per_staff.treble, StaffOnsets::new(vec![67, 71], vec![]));
    assert_eq!(events[0].per_staff.bass, StaffOnsets::new(vec![55, 62], vec![]));
    assert_eq!(events[3].per_staff.treble, StaffOnsets::new(vec![66, 74], vec![67, 69, 71]));
    assert_eq!(events[3].per_staff.bass, StaffOnsets::new(vec![], vec![55, 62]));
}

#[test]
fn conversion_is_deterministic() {
    let pipeline = ConversionPipeline::new();
    let first = pipeline.convert(&chorale_bar()).unwrap();
    let second = pipeline.convert(&chorale_bar()).unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn pickup_stays_short_and_later_gaps_are_filled() {
    let part = SourcePart::named(
        "Soprano",
        vec![
            measure(vec![note(Step::G, 0, 4, 1.0)]),
            measure(vec![note(Step::C, 0, 5, 1.0), note(Step::D, 0, 5, 1.0)]),
        ],
    );
    let doc = ConversionPipeline::new()
        .convert(&SourceScore::new(vec![part]))
        .unwrap()
        .score;
    let pickup = &doc.measures[0].staves.treble.voices[0].items;
    assert_eq!(pickup.len(), 1);
    let second = &doc.measures[1].staves.treble.voices[0].items;
    assert_eq!(second[2], ScoreItem::rest(SymbolicDuration::plain(DurationType::Half)));
    let total: f64 = second.iter().map(ScoreItem::quarter_length).sum();
    approx::assert_abs_diff_eq!(total, 4.0, epsilon = 0.01);
}

#[test]
fn roles_survive_part_order_shuffles() {
    let base = chorale_bar().parts;
    let orders = [[0, 1, 2, 3], [3, 2, 1, 0], [2, 0, 3, 1], [1, 3, 0, 2]];
    for order in orders {
        let parts: Vec<SourcePart> = order.iter().map(|&i| base[i].clone()).collect();
        let roles = RoleClassifier.classify(&parts);
        for (role, original) in Role::ALL.into_iter().zip(0..) {
            let found = roles.part(role).unwrap();
            assert_eq!(order[found], original);
        }
    }
}

#[test]
fn invalid_step_rejects_the_document() {
    let json = r#"{"parts":[{"measures":[{"elements":[
        {"kind":"note","pitch":{"step":"H","octave":4},"quarterLength":1.0}
    ]}]}]}"#;
    assert!(serde_json::from_str::<SourceScore>(json).is_err());
}
