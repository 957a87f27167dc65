use chorale_domain::{
    CirDocument, DomainError, Measure, SourceScore, Staff, StaffId, Staves, Voice,
};
use tracing::{debug, info};

use crate::measure::build_voice;
use crate::meta::MetaInference;
use crate::roles::{Role, RoleClassifier, RoleMap};

/// Builds the canonical document from a parsed score.
#[derive(Default)]
pub struct CirAssembler {
    roles: RoleClassifier,
    meta: MetaInference,
}

impl CirAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assemble(&self, score: &SourceScore) -> Result<CirDocument, DomainError> {
        if score.parts.is_empty() {
            return Err(DomainError::EmptyScore);
        }
        let measure_count = score.max_measure_count();
        if measure_count == 0 {
            return Err(DomainError::NoMeasures);
        }
        let meta = self.meta.infer(score)?;
        let roles = self.roles.classify(&score.parts);
        info!(
            parts = score.parts.len(),
            roles = roles.assigned_count(),
            measures = measure_count,
            "assembling canonical score"
        );
        let target = meta.time.quarters_per_measure();
        let measures = (0..measure_count)
            .map(|index| self.assemble_measure(score, &roles, index, target))
            .collect();
        Ok(CirDocument { meta, measures })
    }

    fn assemble_measure(&self, score: &SourceScore, roles: &RoleMap, index: usize, target: f64) -> Measure {
        let staff = |id: StaffId| {
            let voices = Role::on_staff(id)
                .into_iter()
                .filter_map(|role| {
                    let part = roles.part(role)?;
                    let built = build_voice(&score.parts[part], index, target);
                    if built.padding > 0 {
                        debug!(measure = index + 1, %role, rests = built.padding, "padded voice");
                    }
                    Some(Voice::new(role.direction(), built.items))
                })
                .collect();
            Staff::new(id.clef(), voices)
        };
        Measure {
            number: index as u32 + 1,
            staves: Staves {
                treble: staff(StaffId::Treble),
                bass: staff(StaffId::Bass),
            },
        }
    }
}
