//! Runs the binary-search depth finder against an in-process mock tester that
//! reports "vulnerable" once the rendered payload reaches three levels deep,
//! mimicking a target whose document root sits exactly three directories
//! below the web root.

use async_trait::async_trait;
use dotpath_fuzz::{analyze_traversal_pattern, find_minimum_depth, BisectionParams, BisectionTester};
use dotpath_fuzz::{OsType, Payload};
use std::time::Duration;

struct ThreeDeepTarget;

#[async_trait]
impl BisectionTester for ThreeDeepTarget {
    async fn test_vulnerability(&self, payload: &Payload) -> bool {
        let rendered = payload.to_string_lossy();
        rendered.matches("../").count() >= 3
    }
}

#[tokio::main]
async fn main() {
    let params = BisectionParams {
        os: OsType::Unix,
        target_file: Some("/etc/passwd".to_string()),
        extension: None,
        delay: Duration::ZERO,
    };

    let depth = find_minimum_depth(&ThreeDeepTarget, 1, 10, &params).await;
    println!("minimum vulnerable depth: {depth:?}");

    let analysis = analyze_traversal_pattern("../../../etc/passwd%00.html");
    println!("pattern analysis: {analysis:?}");
}
