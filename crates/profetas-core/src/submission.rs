use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use profetas_store::{Backend, StoreError};
use profetas_types::models::{ENTRY_FEE, Match, MatchId, NewParticipation, Participation, Pick};

use crate::loader::current_round;
use crate::lock::match_locked;
use crate::selection::Selections;

/// What to do with a participation whose picks could not be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrphanPolicy {
    /// Leave it in place with no picks.
    #[default]
    Keep,
    /// Delete it again.
    Compensate,
}

impl fmt::Display for OrphanPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Keep => "keep",
            Self::Compensate => "compensate",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown orphan policy {0:?}, expected \"keep\" or \"compensate\"")]
pub struct UnknownPolicy(pub String);

impl FromStr for OrphanPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep" => Ok(Self::Keep),
            "compensate" => Ok(Self::Compensate),
            _ => Err(UnknownPolicy(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContactDetails {
    pub nombre: String,
    pub telefono: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Selecciona al menos un pronóstico.")]
    NoSelections,

    #[error("Por favor escribe tu nombre y teléfono.")]
    MissingContact,

    #[error("El partido {0} no está en la quiniela.")]
    UnknownMatch(MatchId),

    #[error("El partido {0} ya está cerrado.")]
    MatchLocked(MatchId),

    #[error("{0}")]
    Participation(#[source] StoreError),

    /// The participation exists (unless `compensated`) but has no picks.
    #[error("{source}")]
    Picks {
        participation_id: Uuid,
        compensated: bool,
        #[source]
        source: StoreError,
    },
}

impl SubmitError {
    /// True when nothing was written because the input was rejected up front.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Participation(_) | Self::Picks { .. })
    }
}

/// Outcome of a successful submission.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub participation: Participation,
    pub folio: String,
    pub picks: Vec<Pick>,
}

/// Stores a participation and its picks: first the parent row, then the pick
/// batch referencing its generated id.
#[derive(Clone)]
pub struct SubmissionFlow {
    backend: Arc<dyn Backend>,
    policy: OrphanPolicy,
}

impl SubmissionFlow {
    pub fn new(backend: Arc<dyn Backend>, policy: OrphanPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn policy(&self) -> OrphanPolicy {
        self.policy
    }

    /// Checks done before anything is written, in the order the user sees
    /// them: picks first, then contact details, then each picked match.
    pub fn validate(
        matches: &[Match],
        selections: &Selections,
        contact: &ContactDetails,
        now: DateTime<Utc>,
    ) -> Result<(), SubmitError> {
        if selections.is_empty() {
            return Err(SubmitError::NoSelections);
        }
        if contact.nombre.trim().is_empty() || contact.telefono.trim().is_empty() {
            return Err(SubmitError::MissingContact);
        }
        for (match_id, _) in selections.iter() {
            let m = matches
                .iter()
                .find(|m| m.id == match_id)
                .ok_or(SubmitError::UnknownMatch(match_id))?;
            if match_locked(m, now) {
                return Err(SubmitError::MatchLocked(match_id));
            }
        }
        Ok(())
    }

    /// Validate and store. On success `selections` is cleared.
    pub async fn submit(
        &self,
        matches: &[Match],
        selections: &mut Selections,
        contact: &ContactDetails,
        now: DateTime<Utc>,
    ) -> Result<Receipt, SubmitError> {
        Self::validate(matches, selections, contact, now)?;

        let new = NewParticipation {
            nombre_completo: contact.nombre.trim().to_string(),
            telefono: contact.telefono.trim().to_string(),
            jornada: current_round(matches),
            monto_pagar: ENTRY_FEE,
        };

        let participation = self.backend.create_participation(&new).await.map_err(|e| {
            error!("Failed to create participation: {}", e);
            SubmitError::Participation(e)
        })?;

        let picks: Vec<Pick> = selections
            .iter()
            .map(|(partido_id, seleccion)| Pick {
                participacion_id: participation.id,
                partido_id,
                seleccion,
            })
            .collect();

        if let Err(source) = self.backend.create_picks(&picks).await {
            error!("Failed to store picks for participation {}: {}", participation.id, source);
            let compensated = self.handle_orphan(participation.id).await;
            return Err(SubmitError::Picks {
                participation_id: participation.id,
                compensated,
                source,
            });
        }

        selections.clear();
        info!(
            "Participation {} registered: {} picks, jornada {}",
            participation.id,
            picks.len(),
            participation.jornada
        );

        Ok(Receipt {
            folio: participation.folio(),
            participation,
            picks,
        })
    }

    async fn handle_orphan(&self, participation_id: Uuid) -> bool {
        match self.policy {
            OrphanPolicy::Keep => {
                warn!("Participation {} left without picks", participation_id);
                false
            }
            OrphanPolicy::Compensate => match self.backend.delete_participation(participation_id).await {
                Ok(()) => {
                    info!("Deleted participation {} after failed pick insert", participation_id);
                    true
                }
                Err(e) => {
                    error!("Could not delete orphaned participation {}: {}", participation_id, e);
                    false
                }
            },
        }
    }
}
