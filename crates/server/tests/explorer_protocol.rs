#![forbid(unsafe_code)]

mod support;
use support::*;

use serde_json::{Value, json};

fn case_proof() -> Value {
    json!({
        "id": "root", "name": "foo1", "type": "root",
        "rules": [
            { "id": "sk", "name": "(skosimp*)", "type": "proof-command" },
            { "id": "as", "name": "(assert)", "type": "proof-command" },
            {
                "id": "cs", "name": "(case \"x!1 > 0\")", "type": "proof-command",
                "rules": [
                    { "id": "b1", "branch": "1", "name": "(1)", "type": "proof-branch" },
                    { "id": "b2", "branch": "2", "name": "(2)", "type": "proof-branch" }
                ]
            }
        ]
    })
}

#[test]
fn newline_session_loads_and_queries_a_proof() {
    let mut server = Server::start_initialized("newline_load");
    let loaded = server.load_proof(2, case_proof());
    assert_eq!(loaded["result"], json!({ "applied": true, "changed": true }));

    let tree = server.call(3, "explorer/getTreeStructure", json!({}));
    let tree = &tree["result"]["tree"];
    assert_eq!(tree["name"], "foo1");
    assert_eq!(tree["children"][0]["name"], "(skosimp*)");

    let children = server.call(4, "explorer/getChildren", json!({ "id": "cs" }));
    let names: Vec<&str> = children["result"]["children"]
        .as_array()
        .expect("children")
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert_eq!(names, vec!["(1)", "(2)"]);
}

#[test]
fn content_length_framing_is_detected_and_kept() {
    let mut server = Server::start("content_length");
    let body = json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" }).to_string();
    let frame = format!("Content-Length: {}\r\n\r\n{body}", body.len());
    server.send_raw(frame.as_bytes());
    let reply = server.recv_framed();
    assert_eq!(reply, json!({ "jsonrpc": "2.0", "id": 1, "result": {} }));

    let body = json!({ "jsonrpc": "2.0", "id": 2, "method": "explorer/getState" }).to_string();
    let frame = format!("Content-Length: {}\r\nContent-Type: application/json\r\n\r\n{body}", body.len());
    server.send_raw(frame.as_bytes());
    let reply = server.recv_framed();
    assert_eq!(reply["id"], 2);
    assert_eq!(reply["result"]["loaded"], false);
}

#[test]
fn strict_init_rejects_requests_before_the_handshake() {
    let mut server = Server::start_with_args("strict_init", &["--strict-init"]);
    let early = server.call(1, "explorer/getState", json!({}));
    assert_eq!(early["error"]["code"], -32002);

    server.initialize_default();
    let state = server.call(3, "explorer/getState", json!({}));
    assert_eq!(state["result"]["loaded"], false);
}

#[test]
fn parse_errors_do_not_end_the_session() {
    let mut server = Server::start_initialized("parse_errors");
    server.send_raw(b"{\"jsonrpc\": \n");
    let reply = server.recv();
    assert_eq!(reply["error"]["code"], -32700);
    let reply = server.request(json!({ "jsonrpc": "2.0", "id": 5 }));
    assert_eq!(reply["error"]["code"], -32600);
    let ping = server.call(6, "ping", json!({}));
    assert_eq!(ping["result"], json!({}));
}

#[test]
fn requests_go_out_as_prover_commands() {
    let mut server = Server::start_initialized("prover_commands");
    server.load_proof(2, case_proof());

    let reply = server.call(
        3,
        "explorer/edit",
        json!({ "action": "rename-node", "selected": { "id": "as", "name": "(assert)" }, "newName": "(flatten)" }),
    );
    assert_eq!(reply["result"]["applied"], true);
    let command = server.recv();
    assert_eq!(command["method"], "prover/command");
    assert_eq!(
        command["params"],
        json!({ "action": "rename-node", "selected": { "id": "as", "name": "(assert)" }, "newName": "(flatten)" })
    );

    // The tree only changes once the prover confirms.
    let proof = server.call(4, "explorer/getProof", json!({}));
    assert_eq!(proof["result"]["proof"]["rules"][1]["name"], "(assert)");

    server.notify(
        "proofEdit/didRenameNode",
        json!({ "selected": { "id": "as", "name": "(assert)" }, "newName": "(flatten)" }),
    );
    let proof = server.call(5, "explorer/getProof", json!({}));
    assert_eq!(proof["result"]["proof"]["rules"][1]["name"], "(flatten)");
}

#[test]
fn run_to_target_reports_the_stop() {
    let mut server = Server::start_initialized("run_to_target");
    server.load_proof(2, case_proof());
    server.call(
        3,
        "explorer/fastForward",
        json!({ "selected": { "id": "as", "name": "(assert)" } }),
    );
    let command = server.recv();
    assert_eq!(command["params"]["action"], "fast-forward");

    server.notify(
        "proofNode/didUpdateStatus",
        json!({ "id": "sk", "name": "(skosimp*)", "status": "active" }),
    );
    server.notify(
        "proofNode/didUpdateStatus",
        json!({ "id": "as", "name": "(assert)", "status": "active" }),
    );
    let stopped = server.recv();
    assert_eq!(stopped["method"], "explorer/didStopExecution");

    let state = server.call(4, "explorer/getState", json!({}));
    assert_eq!(state["result"]["running"], false);
    assert_eq!(state["result"]["activeNode"]["id"], "as");
}

#[test]
fn step_results_reconcile_and_notify_tree_changes() {
    let mut server = Server::start_with_args("step_results", &["--tree-notifications"]);
    server.initialize_default();
    server.load_proof(2, json!({ "id": "root", "name": "foo1", "type": "root" }));
    let changed = server.recv();
    assert_eq!(changed["method"], "explorer/didChangeTree");
    assert_eq!(changed["params"]["source"], "did-load-proof");

    let reply = server.call(
        3,
        "proofExec/didExecuteStep",
        json!({
            "parent": "root",
            "position": 0,
            "elem": { "id": "g", "name": "(grind)", "type": "proof-command" }
        }),
    );
    assert_eq!(reply["result"]["changed"], true);
    let changed = server.recv();
    assert_eq!(changed["params"]["source"], "did-append-node");

    let script = server.call(4, "explorer/getProofScript", json!({}));
    assert_eq!(script["result"]["script"], "(grind)");
}

#[test]
fn core_errors_are_results_not_transport_errors() {
    let mut server = Server::start_initialized("core_errors");
    let reply = server.call(2, "explorer/getChildren", json!({ "id": "missing" }));
    assert!(reply.get("error").is_none());
    assert_eq!(reply["result"]["applied"], false);
    assert_eq!(reply["result"]["error"]["code"], "NO_PROOF");
}

#[test]
fn exit_ends_the_process_and_records_the_session() {
    let mut server = Server::start_initialized("exit");
    server.call(2, "shutdown", json!(null));
    server.notify("exit", json!({}));
    let log_dir = server.log_dir().to_path_buf();
    let status = server.wait();
    assert!(status.success());
    let record = std::fs::read_to_string(log_dir.join("proofmind_last_session.txt"))
        .expect("session record");
    assert!(record.contains("framing=newline_json"));
    assert!(record.contains("exit=exit"));
}
