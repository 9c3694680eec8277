use crate::names::NameId;
use rustc_hash::FxHashMap;

/// What a filter over a variable read means for cached filtered values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterUse {
    /// First filter of the variable's current value
    Fresh,
    /// The current value was already filtered
    Repeat,
    /// A value from an earlier assignment was filtered too; a cache keyed by
    /// the name would serve that value
    Stale { previous_epoch: u32, epoch: u32 },
}

#[derive(Debug, Clone, Copy, Default)]
struct EpochState {
    epoch: u32,
    filtered_current: bool,
    first_filtered_epoch: Option<u32>,
}

/// Tracks, per variable, which assignment epochs have been filtered
#[derive(Debug, Default)]
pub struct FilterEpochs {
    states: FxHashMap<NameId, EpochState>,
}

impl FilterEpochs {
    pub fn new() -> Self {
        Self::default()
    }

    /// An assignment starts a new epoch with nothing filtered yet
    pub fn record_assign(&mut self, name: NameId) {
        let state = self.states.entry(name).or_default();
        state.epoch += 1;
        state.filtered_current = false;
    }

    pub fn record_filter(&mut self, name: NameId) -> FilterUse {
        let state = self.states.entry(name).or_default();
        if state.filtered_current {
            return FilterUse::Repeat;
        }
        state.filtered_current = true;
        match state.first_filtered_epoch {
            Some(previous_epoch) if previous_epoch < state.epoch => FilterUse::Stale {
                previous_epoch,
                epoch: state.epoch,
            },
            Some(_) => FilterUse::Repeat,
            None => {
                state.first_filtered_epoch = Some(state.epoch);
                FilterUse::Fresh
            }
        }
    }
}
