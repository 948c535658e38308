use crate::models::job_seeker::Status;

/// Whether a job seeker may move from `from` to `to`.
///
/// Staying put is always allowed, any status may jump straight to `CLOSED`,
/// and otherwise only a single step forward is accepted.
pub fn is_allowed_transition(from: Status, to: Status) -> bool {
    if from == to {
        return true;
    }
    if to == Status::Closed {
        return true;
    }
    to.index() == from.index() + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use Status::*;

    #[test]
    fn self_transitions_are_allowed() {
        for s in Status::ORDER {
            assert!(is_allowed_transition(s, s), "{s} -> {s}");
        }
    }

    #[test]
    fn every_status_may_close() {
        for s in Status::ORDER {
            assert!(is_allowed_transition(s, Closed), "{s} -> CLOSED");
        }
    }

    #[test]
    fn skipping_ahead_is_rejected() {
        assert!(!is_allowed_transition(New, Proposing));
        assert!(!is_allowed_transition(New, Offered));
        assert!(!is_allowed_transition(Interviewed, Offered));
    }

    #[test]
    fn moving_backward_is_rejected() {
        assert!(!is_allowed_transition(Offered, New));
        assert!(!is_allowed_transition(Interviewed, New));
        assert!(!is_allowed_transition(Offered, Proposing));
    }

    #[test]
    fn closed_is_terminal() {
        for s in [New, Interviewed, Proposing, Offered] {
            assert!(!is_allowed_transition(Closed, s), "CLOSED -> {s}");
        }
    }

    #[test]
    fn exactly_twelve_pairs_are_allowed() {
        let allowed: Vec<(Status, Status)> = Status::ORDER
            .iter()
            .flat_map(|&from| Status::ORDER.iter().map(move |&to| (from, to)))
            .filter(|&(from, to)| is_allowed_transition(from, to))
            .collect();

        let expected = vec![
            (New, New),
            (New, Interviewed),
            (New, Closed),
            (Interviewed, Interviewed),
            (Interviewed, Proposing),
            (Interviewed, Closed),
            (Proposing, Proposing),
            (Proposing, Offered),
            (Proposing, Closed),
            (Offered, Offered),
            (Offered, Closed),
            (Closed, Closed),
        ];
        assert_eq!(allowed, expected);
    }
}
