use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use profetas_types::models::{Match, NewParticipation, Participation, Pick, Profile};

use crate::Backend;
use crate::error::{Result, StoreError};

/// Backend operations, used to inject failures and to read the call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    LoadMatches,
    LoadProfiles,
    CreateParticipation,
    CreatePicks,
    DeleteParticipation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    LoadMatches { limit: u32 },
    LoadProfiles,
    CreateParticipation(NewParticipation),
    CreatePicks(Vec<Pick>),
    DeleteParticipation(Uuid),
}

#[derive(Default)]
struct MemoryState {
    matches: Vec<Match>,
    profiles: Vec<Profile>,
    participations: Vec<Participation>,
    picks: Vec<Pick>,
    calls: Vec<Call>,
    failing: HashSet<Operation>,
}

/// In-process backend that records every call and can be told to fail
/// specific operations.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_matches(self, matches: Vec<Match>) -> Self {
        self.lock().matches = matches;
        self
    }

    pub fn with_profiles(self, profiles: Vec<Profile>) -> Self {
        self.lock().profiles = profiles;
        self
    }

    /// Make every future call to `operation` fail.
    pub fn fail(&self, operation: Operation) {
        self.lock().failing.insert(operation);
    }

    pub fn recover(&self, operation: Operation) {
        self.lock().failing.remove(&operation);
    }

    pub fn set_matches(&self, matches: Vec<Match>) {
        self.lock().matches = matches;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn participations(&self) -> Vec<Participation> {
        self.lock().participations.clone()
    }

    pub fn picks(&self) -> Vec<Pick> {
        self.lock().picks.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A panicking test thread must not hide the state from the others.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, operation: Operation, call: Call) -> Result<MutexGuard<'_, MemoryState>> {
        let mut state = self.lock();
        state.calls.push(call);
        if state.failing.contains(&operation) {
            return Err(StoreError::Unavailable(format!("{:?} failed", operation)));
        }
        Ok(state)
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn load_matches(&self, limit: u32) -> Result<Vec<Match>> {
        let state = self.record(Operation::LoadMatches, Call::LoadMatches { limit })?;
        let mut matches = state.matches.clone();
        matches.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        matches.truncate(limit as usize);
        Ok(matches)
    }

    async fn load_profiles(&self) -> Result<Vec<Profile>> {
        let state = self.record(Operation::LoadProfiles, Call::LoadProfiles)?;
        Ok(state.profiles.clone())
    }

    async fn create_participation(&self, new: &NewParticipation) -> Result<Participation> {
        let mut state = self.record(
            Operation::CreateParticipation,
            Call::CreateParticipation(new.clone()),
        )?;
        let participation = Participation {
            id: Uuid::new_v4(),
            nombre_completo: new.nombre_completo.clone(),
            telefono: new.telefono.clone(),
            jornada: new.jornada,
            monto_pagar: new.monto_pagar,
            created_at: Some(Utc::now()),
        };
        state.participations.push(participation.clone());
        Ok(participation)
    }

    async fn create_picks(&self, picks: &[Pick]) -> Result<()> {
        let mut state = self.record(Operation::CreatePicks, Call::CreatePicks(picks.to_vec()))?;
        state.picks.extend_from_slice(picks);
        Ok(())
    }

    async fn delete_participation(&self, id: Uuid) -> Result<()> {
        let mut state = self.record(Operation::DeleteParticipation, Call::DeleteParticipation(id))?;
        state.participations.retain(|p| p.id != id);
        state.picks.retain(|p| p.participacion_id != id);
        Ok(())
    }
}
