use super::*;
use crate::testing::RecordingExecutor;
use std::time::Duration;

#[test]
fn test_render_command_with_unknown_total() {
    assert_eq!(
        render_command("echo ${camera} ${n}/${total}", "GX800", 3, None),
        "echo GX800 3/-"
    );
    assert_eq!(
        render_command("notify $camera: $n of $total", "G9", 12, Some(40)),
        "notify G9: 12 of 40"
    );
}

#[test]
fn test_substitute_leaves_unknown_placeholders() {
    let values = [("camera", "GX800")];
    assert_eq!(substitute("${camera} ${other} $other", &values), "GX800 ${other} $other");
    assert_eq!(substitute("cost: $$5 ${camera}", &values), "cost: $5 GX800");
    assert_eq!(substitute("$cameras", &values), "$cameras");
    assert_eq!(substitute("trailing $", &values), "trailing $");
    assert_eq!(substitute("${camera", &values), "${camera");
    assert_eq!(substitute("${1x} $9", &values), "${1x} $9");
    assert_eq!(substitute("no placeholders", &values), "no placeholders");
}

#[tokio::test]
async fn test_notify_runs_rendered_command() {
    let executor = Arc::new(RecordingExecutor::default());
    let notifier = CompletionNotifier::new(
        Some("echo ${camera} ${n}/${total}".to_string()),
        executor.clone(),
        EventBus::new(8),
    );

    notifier.notify("GX800", 3, None).await;

    assert_eq!(executor.commands(), vec!["echo GX800 3/-".to_string()]);
}

#[tokio::test]
async fn test_notify_without_template_is_noop() {
    let executor = Arc::new(RecordingExecutor::default());
    let notifier = CompletionNotifier::new(Some("   ".to_string()), executor.clone(), EventBus::new(8));

    assert!(!notifier.is_configured());
    notifier.notify("GX800", 3, Some(3)).await;

    assert!(executor.commands().is_empty());
}

#[tokio::test]
async fn test_command_failures_are_published_not_returned() {
    let bus = EventBus::new(8);
    let mut events = bus.subscribe();
    let executor = Arc::new(RecordingExecutor {
        exit_code: Some(2),
        ..Default::default()
    });
    let notifier = CompletionNotifier::new(Some("false".to_string()), executor, bus.clone());

    notifier.notify("GX800", 0, None).await;

    match events.try_recv().unwrap() {
        SyncEvent::CommandFailed { camera, error } => {
            assert_eq!(camera, "GX800");
            assert!(error.contains('2'));
        }
        other => panic!("Unexpected event {:?}", other),
    }

    let broken = Arc::new(RecordingExecutor {
        fail_to_start: true,
        ..Default::default()
    });
    CompletionNotifier::new(Some("x".to_string()), broken, bus)
        .notify("GX800", 0, None)
        .await;
    assert!(matches!(
        events.try_recv().unwrap(),
        SyncEvent::CommandFailed { .. }
    ));
}

#[tokio::test]
async fn test_shell_executor_reports_exit_status() {
    let shell = ShellExecutor::new(Duration::from_secs(10));

    assert!(shell.execute("true").await.unwrap().success());
    assert_eq!(shell.execute("exit 3").await.unwrap().code, Some(3));
}

#[tokio::test]
async fn test_shell_executor_kills_on_timeout() {
    let shell = ShellExecutor::new(Duration::from_millis(100));

    let result = shell.execute("sleep 5").await;

    assert!(result.unwrap_err().contains("timed out"));
}

#[tokio::test]
async fn test_shell_receives_substituted_command() {
    let dir = tempfile::TempDir::new().unwrap();
    let marker = dir.path().join("done.txt");
    let template = format!("echo ${{camera}} ${{n}}/${{total}} > {}", marker.display());
    let notifier = CompletionNotifier::new(
        Some(template),
        Arc::new(ShellExecutor::new(Duration::from_secs(10))),
        EventBus::new(8),
    );

    notifier.notify("GX800", 3, None).await;

    assert_eq!(std::fs::read_to_string(&marker).unwrap(), "GX800 3/-\n");
}
