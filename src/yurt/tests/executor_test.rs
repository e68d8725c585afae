//! Tests for command rendering and the shell executor.

use yurt::executor::{shell_quote, trim_output};
use yurt::{render_command, BootstrapError, CommandExecutor, ShellExecutor};

#[test]
fn test_render_fills_placeholders_in_order() {
    let rendered =
        render_command("kubectl -n {} delete pod {}", &["kube-system", "coredns-abc"]).unwrap();
    assert_eq!(rendered, "kubectl -n kube-system delete pod coredns-abc");
}

#[test]
fn test_render_without_placeholders() {
    let rendered = render_command("sudo systemctl restart kubelet", &[]).unwrap();
    assert_eq!(rendered, "sudo systemctl restart kubelet");
}

#[test]
fn test_render_does_not_rescan_substituted_args() {
    let rendered = render_command("echo {} {}", &["{}", "b"]).unwrap();
    assert_eq!(rendered, "echo {} b");
}

#[test]
fn test_render_rejects_too_few_args() {
    let err = render_command("git clone {} {}", &["repo"]).unwrap_err();
    assert!(matches!(err, BootstrapError::CommandFailed(_)));
}

#[test]
fn test_render_rejects_too_many_args() {
    let err = render_command("mkdir -p {}", &["/a", "/b"]).unwrap_err();
    assert!(matches!(err, BootstrapError::CommandFailed(_)));
}

#[test]
fn test_shell_quote_escapes_single_quotes() {
    assert_eq!(shell_quote("plain"), "'plain'");
    assert_eq!(shell_quote("it's"), r"'it'\''s'");
    assert_eq!(shell_quote("a: {b}\n"), "'a: {b}\n'");
}

#[test]
fn test_trim_output_keeps_inner_lines() {
    assert_eq!(trim_output("a\nb\n\r\n"), "a\nb");
    assert_eq!(trim_output("  padded  \n"), "  padded  ");
}

#[tokio::test]
async fn test_shell_executor_returns_trimmed_stdout() {
    let executor = ShellExecutor::with_shell("sh");
    let output = executor.execute("echo {}", &["hello"]).await.unwrap();
    assert_eq!(output, "hello");
}

#[tokio::test]
async fn test_shell_executor_keeps_multiline_output() {
    let executor = ShellExecutor::with_shell("sh");
    let output = executor
        .execute("printf '%s\\n%s\\n\\n' {} {}", &["kube-system", "coredns"])
        .await
        .unwrap();
    assert_eq!(output, "kube-system\ncoredns");
}

#[tokio::test]
async fn test_shell_executor_reports_failure_with_stderr() {
    let executor = ShellExecutor::with_shell("sh");
    let err = executor
        .execute("echo {} >&2; exit 3", &["taint not found"])
        .await
        .unwrap_err();
    match err {
        BootstrapError::CommandFailed(message) => {
            assert!(message.contains("taint not found"), "got {}", message);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_shell_executor_quoted_content_survives() {
    let executor = ShellExecutor::with_shell("sh");
    let content = "key: 'value'\nother: {}\n";
    let output = executor
        .execute("printf '%s' {}", &[&shell_quote(content)])
        .await
        .unwrap();
    assert_eq!(output, "key: 'value'\nother: {}");
}

#[tokio::test]
async fn test_shell_executor_missing_shell() {
    let executor = ShellExecutor::with_shell("/nonexistent/shell");
    let err = executor.execute("true", &[]).await.unwrap_err();
    assert!(matches!(err, BootstrapError::CommandFailed(_)));
}
