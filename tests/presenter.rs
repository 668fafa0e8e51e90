#[cfg(test)]
mod tests {
    use ergonomy::libs::escalation::{InterruptionRequest, Level, OutcomeKind};
    use ergonomy::libs::presenter::{ConsolePresenter, Presentation, Presenter};
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time;

    #[tokio::test(start_paused = true)]
    async fn test_console_presenter_reports_outcome() {
        let (dismiss_tx, dismiss_rx) = mpsc::unbounded_channel();
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
        let mut presenter = ConsolePresenter::new(dismiss_rx);

        let request = InterruptionRequest::primary(4, Duration::from_secs(30), None);
        assert_eq!(presenter.present(request.clone(), outcome_tx.clone()), Presentation::Shown);
        assert_eq!(
            presenter.present(InterruptionRequest::primary(5, Duration::from_secs(30), None), outcome_tx),
            Presentation::Busy
        );

        time::sleep(Duration::from_secs(1)).await;
        dismiss_tx.send(()).unwrap();
        let outcome = outcome_rx.recv().await.unwrap();
        assert_eq!(outcome.request_id, 4);
        assert_eq!(outcome.level, Level::Primary);
        assert_eq!(outcome.kind, OutcomeKind::UserDismissed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_console_presenter_accepts_next_after_close() {
        let (_dismiss_tx, dismiss_rx) = mpsc::unbounded_channel();
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
        let mut presenter = ConsolePresenter::new(dismiss_rx);

        presenter.present(InterruptionRequest::secondary(1, Duration::from_secs(1), Duration::from_secs(1)), outcome_tx.clone());
        let first = outcome_rx.recv().await.unwrap();
        assert_eq!(first.kind, OutcomeKind::TimedOut);
        assert_eq!(first.level, Level::Secondary);
        time::sleep(Duration::from_millis(10)).await;

        assert_eq!(
            presenter.present(InterruptionRequest::primary(2, Duration::from_secs(1), None), outcome_tx),
            Presentation::Shown
        );
        assert_eq!(outcome_rx.recv().await.unwrap().request_id, 2);
    }

    #[tokio::test]
    async fn test_shutdown_drops_pending_interruption() {
        let (_dismiss_tx, dismiss_rx) = mpsc::unbounded_channel();
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
        let mut presenter = ConsolePresenter::new(dismiss_rx);

        presenter.present(InterruptionRequest::primary(1, Duration::from_secs(60), None), outcome_tx);
        presenter.shutdown();

        // The aborted task drops its sender without answering
        assert!(outcome_rx.recv().await.is_none());
    }
}
