//! Grading timeline: one event per distinct onset, listing per staff which
//! pitches are attacked and which carry over from earlier events.

use std::collections::BTreeMap;

use chorale_domain::{
    quarters_to_ticks, CirDocument, Event, MeasureStartMode, PerStaff, ReleaseMode, StaffId,
    StaffOnsets, Tie, TiedOnsetMode, TimelineOptions,
};
use tracing::debug;

/// A sounding pitch placed on the absolute timeline (quarter notes).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Occurrence {
    pub staff: StaffId,
    pub voice: usize,
    pub start: f64,
    pub duration: f64,
    pub pitch: i32,
    pub tie: Tie,
}

impl Occurrence {
    fn release_tick(&self) -> u64 {
        quarters_to_ticks(self.start + self.duration)
    }
}

/// Walks every voice of every measure, advancing a cursor by each item's
/// symbolic length. Rests move the cursor without producing occurrences.
pub fn collect_occurrences(doc: &CirDocument, mode: MeasureStartMode) -> Vec<Occurrence> {
    let nominal = doc.meta.time.quarters_per_measure();
    let mut occurrences = Vec::new();
    let mut measure_start = 0.0;
    for measure in &doc.measures {
        for (staff, contents) in measure.staves.iter() {
            for (voice, line) in contents.voices.iter().enumerate() {
                let mut cursor = measure_start;
                for item in &line.items {
                    let duration = item.quarter_length();
                    occurrences.extend(item.sounding().into_iter().map(|(pitch, tie)| Occurrence {
                        staff,
                        voice,
                        start: cursor,
                        duration,
                        pitch: pitch.number(),
                        tie,
                    }));
                    cursor += duration;
                }
            }
        }
        measure_start += match mode {
            MeasureStartMode::Nominal => nominal,
            MeasureStartMode::Actual => match measure.longest_voice() {
                length if length > 0.0 => length,
                _ => nominal,
            },
        };
    }
    occurrences
}

/// Pitches currently sounding on each staff, with the tick at which their
/// notated duration ends.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActivePitches {
    treble: BTreeMap<i32, u64>,
    bass: BTreeMap<i32, u64>,
}

impl ActivePitches {
    fn staff(&self, id: StaffId) -> &BTreeMap<i32, u64> {
        match id {
            StaffId::Treble => &self.treble,
            StaffId::Bass => &self.bass,
        }
    }

    fn staff_mut(&mut self, id: StaffId) -> &mut BTreeMap<i32, u64> {
        match id {
            StaffId::Treble => &mut self.treble,
            StaffId::Bass => &mut self.bass,
        }
    }

    pub fn pitches(&self, id: StaffId) -> Vec<i32> {
        self.staff(id).keys().copied().collect()
    }
}

#[derive(Default)]
pub struct EventTimelineBuilder {
    options: TimelineOptions,
}

impl EventTimelineBuilder {
    pub fn new(options: TimelineOptions) -> Self {
        Self { options }
    }

    pub fn build(&self, doc: &CirDocument) -> Vec<Event> {
        let mut onsets: BTreeMap<u64, Vec<Occurrence>> = BTreeMap::new();
        for occurrence in collect_occurrences(doc, self.options.measure_start) {
            onsets
                .entry(quarters_to_ticks(occurrence.start))
                .or_default()
                .push(occurrence);
        }
        debug!(onsets = onsets.len(), "building grading timeline");
        let (_, events) = onsets.into_iter().fold(
            (ActivePitches::default(), Vec::new()),
            |(active, mut events), (tick, group)| {
                let (active, event) = self.advance(active, tick, &group);
                events.push(event);
                (active, events)
            },
        );
        events
    }

    /// One fold step: expires released pitches, snapshots holds, then adds
    /// this onset's attacks to the active set.
    pub fn advance(&self, mut active: ActivePitches, tick: u64, group: &[Occurrence]) -> (ActivePitches, Event) {
        let mut per_staff = PerStaff::default();
        for id in StaffId::ALL {
            let here: Vec<&Occurrence> = group.iter().filter(|o| o.staff == id).collect();
            let continued: Vec<i32> = match self.options.tied_onsets {
                TiedOnsetMode::Hold => here.iter().filter(|o| o.tie.stop).map(|o| o.pitch).collect(),
                TiedOnsetMode::Attack => Vec::new(),
            };
            let sounding = active.staff_mut(id);
            if self.options.release == ReleaseMode::Notated {
                sounding.retain(|pitch, release| *release > tick || continued.contains(pitch));
            }
            let holds: Vec<i32> = sounding.keys().copied().collect();
            let mut attacks = Vec::new();
            for occurrence in here {
                let is_continuation = continued.contains(&occurrence.pitch)
                    && occurrence.tie.stop
                    && sounding.contains_key(&occurrence.pitch);
                if !is_continuation {
                    attacks.push(occurrence.pitch);
                }
                let release = sounding.entry(occurrence.pitch).or_insert(0);
                *release = (*release).max(occurrence.release_tick());
            }
            *per_staff.get_mut(id) = StaffOnsets::new(attacks, holds);
        }
        (
            active,
            Event {
                start: tick,
                per_staff,
            },
        )
    }
}
