use clap::Parser;
use expect_test::expect;

use blockgate_cli::{Error, Options, Scenario, Simulation};

fn replay(json: &str, options: &Options) -> Result<String, Error> {
    let scenario: Scenario = serde_json::from_str(json)?;
    let mut simulation = Simulation::new(options);
    simulation.replay(scenario)?;
    Ok(simulation.finish(options))
}

#[test]
fn green_flag_scenario() {
    let args = blockgate_cli::Args::parse_from([
        "blockgate",
        "--dump-state",
        concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios/green-flag.json"),
    ]);

    let transcript = blockgate_cli::run(&args).expect("scenario must replay");
    expect![[r#"
        frame 1: ran [t0(flag), t1(clicked), t2(-)]
        toggle flag (Disable Block): disabled, 4 blocks
        frame 2: ran [t1(clicked), t2(-)]
        attach late under loop
        spawn t3(late)
        frame 3: ran [t1(clicked), t2(-)]
        frame 4: no candidates
        toggle flag (Enable Block): enabled, 5 blocks
        set clicked: disabled, 2 blocks
        frame 5: ran [t0(flag), t2(-), t3(late)]
        frame 6: ran [t0(flag), t2(-), t3(late)]
        remove clicked: 2 blocks, 1 threads retired
        prune: 2 orphans
        clear all: 0 entries
        t0(flag): 3 steps
        t2(-): 5 steps
        t3(late): 2 steps
        disabled: []
    "#]]
    .assert_eq(&transcript);
}

#[test]
fn without_propagation_descendants_stay_enabled() {
    let options = Options {
        propagate: false,
        dump_state: true,
        ..Default::default()
    };

    let transcript = replay(
        r#"{
            "blocks": [{ "id": "a" }, { "id": "b", "parent": "a" }],
            "threads": ["b"],
            "timeline": [{ "toggle": "a" }, { "step": 1 }, { "toggle": "ghost" }]
        }"#,
        &options,
    )
    .expect("scenario must replay");

    expect![[r#"
        toggle a (Disable Block): disabled, 1 blocks
        frame 1: ran []
        toggle ghost: unknown block
        t0(b): 0 steps
        disabled: [a]
    "#]]
    .assert_eq(&transcript);
}

#[test]
fn invalid_tree_edits_are_reported() {
    let err = replay(
        r#"{
            "blocks": [{ "id": "a" }],
            "timeline": [{ "attach": { "id": "b", "parent": "nope" } }]
        }"#,
        &Options::default(),
    )
    .expect_err("attaching below an unknown block must fail");

    assert!(matches!(
        err,
        Error::Tree(blockgate::Error::UnknownNode(ref id)) if id.as_str() == "nope"
    ));
}

#[test]
fn unknown_events_are_rejected() {
    let err = replay(r#"{ "timeline": [{ "explode": "a" }] }"#, &Options::default())
        .expect_err("unknown events must not parse");

    assert!(matches!(err, Error::Parse(_)));
}

#[test]
fn no_color_is_parsed() {
    let args = blockgate_cli::Args::parse_from(["blockgate", "--no-color", "scenario.json"]);
    assert!(args.no_color);

    let args = blockgate_cli::Args::parse_from(["blockgate", "scenario.json"]);
    assert!(!args.no_color || std::env::var_os("NO_COLOR").is_some());
}
