/// Where a coordinator is in its request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing submitted yet, or reset.
    Idle,
    /// A request is in flight.
    Loading,
    /// The last request finished with a result or an error message.
    Settled,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Settled => "settled",
        }
    }
}

/// Snapshot of what the presentation layer renders.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestState<R> {
    pub is_loading: bool,
    pub result: Option<R>,
    pub error_message: Option<String>,
}

impl<R> Default for RequestState<R> {
    fn default() -> Self {
        Self {
            is_loading: false,
            result: None,
            error_message: None,
        }
    }
}

impl<R> RequestState<R> {
    pub fn phase(&self) -> Phase {
        if self.is_loading {
            Phase::Loading
        } else if self.result.is_some() || self.error_message.is_some() {
            Phase::Settled
        } else {
            Phase::Idle
        }
    }

    pub(crate) fn begin(&mut self) {
        self.is_loading = true;
        self.result = None;
        self.error_message = None;
    }

    pub(crate) fn succeed(&mut self, result: R) {
        self.is_loading = false;
        self.result = Some(result);
        self.error_message = None;
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.is_loading = false;
        self.result = None;
        self.error_message = Some(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions() {
        let mut state: RequestState<u32> = RequestState::default();
        assert_eq!(state.phase(), Phase::Idle);

        state.begin();
        assert_eq!(state.phase(), Phase::Loading);

        state.succeed(7);
        assert_eq!(state.phase(), Phase::Settled);
        assert_eq!(state.result, Some(7));

        state.begin();
        assert_eq!(state.result, None, "begin clears the previous result");

        state.fail("nope".into());
        assert_eq!(state.phase(), Phase::Settled);
        assert_eq!(state.error_message.as_deref(), Some("nope"));
        assert!(state.result.is_none());
    }

    #[test]
    fn settling_clears_the_other_outcome() {
        let mut state: RequestState<u32> = RequestState::default();
        state.fail("first".into());
        state.succeed(1);
        assert!(state.error_message.is_none());

        state.fail("second".into());
        assert!(state.result.is_none());
    }
}
