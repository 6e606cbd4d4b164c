//! Argument parsing and URL construction.

use super::*;
use rstest::rstest;

const ID: &str = "67e55044-10b1-426f-9247-bb680e5fe0c8";

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("geoshelf").chain(args.iter().copied()))
        .expect("valid arguments")
}

fn id() -> DocumentId {
    ID.parse().expect("valid id")
}

#[rstest]
fn host_defaults_to_local_server() {
    let cli = parse(&["list"]);
    if std::env::var_os(ENV_HOST).is_none() {
        assert_eq!(cli.host.as_str(), DEFAULT_HOST);
    }
    assert_eq!(cli.command, Command::List);
}

#[rstest]
#[case(&["add", "-f", "route.geojson"], Command::Add { file: "route.geojson".into() })]
#[case(
    &["update", "--file", "route.geojson", "--uuid", ID],
    Command::Update { file: "route.geojson".into(), id: id() }
)]
#[case(&["delete", "-u", ID], Command::Delete { id: id() })]
#[case(&["get", "-u", ID], Command::Get { id: id() })]
#[case(&["get_uuid", "-u", ID], Command::Get { id: id() })]
#[case(&["get_uuids"], Command::List)]
fn subcommands_are_parsed(#[case] args: &[&str], #[case] expected: Command) {
    assert_eq!(parse(args).command, expected);
}

#[rstest]
fn host_flag_is_global() {
    let cli = parse(&["list", "--host", "http://maps.example:8080/api/"]);
    assert_eq!(cli.host.as_str(), "http://maps.example:8080/api/");
}

#[rstest]
fn malformed_ids_are_rejected_by_the_parser() {
    let err = Cli::try_parse_from(["geoshelf", "get", "-u", "not-a-uuid"])
        .expect_err("invalid id");
    assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
}

#[rstest]
#[case("http://127.0.0.1:5000/api/", "http://127.0.0.1:5000/api/")]
#[case("http://127.0.0.1:5000/api", "http://127.0.0.1:5000/api/")]
#[case("http://127.0.0.1:5000", "http://127.0.0.1:5000/")]
fn base_urls_gain_a_trailing_slash(#[case] base: &str, #[case] expected: &str) {
    let client = Client::new(base.parse().expect("url")).expect("client");
    assert_eq!(client.base().as_str(), expected);
    let document = client.document_url(id()).expect("document url");
    assert_eq!(document.as_str(), format!("{expected}{ID}"));
}

#[rstest]
fn bases_without_a_path_are_rejected() {
    let base: Url = "mailto:maps@example.com".parse().expect("url");
    match Client::new(base) {
        Err(ClientError::UnsupportedBase { .. }) => {}
        other => panic!("expected UnsupportedBase, found {other:?}"),
    }
}

#[rstest]
fn missing_upload_files_are_reported() {
    let tmp = tempfile::TempDir::new().expect("tempdir");
    let path = Utf8PathBuf::from_path_buf(tmp.path().join("missing.geojson")).expect("utf-8");
    match upload_form(&path) {
        Err(ClientError::ReadFile { path: reported, .. }) => assert_eq!(reported, path),
        Err(other) => panic!("expected ReadFile, found {other:?}"),
        Ok(_) => panic!("expected ReadFile, found a form"),
    }
}
