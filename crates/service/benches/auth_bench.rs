use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use service::auth::domain::LoginInput;
use service::auth::repository::JsonCredentialRepository;
use service::auth::{AuthConfig, AuthService};
use service::leads::export::export_signups;
use service::leads::Lead;

fn bench_login(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let dir = std::env::temp_dir().join(format!("auth_bench_{}", uuid::Uuid::new_v4()));
    let repo = Arc::new(rt.block_on(JsonCredentialRepository::open(&dir)).unwrap());
    let svc = AuthService::new(
        repo,
        AuthConfig { jwt_secret: "bench-secret-0123456789".into(), password_algorithm: "argon2".into(), session_ttl: chrono::Duration::hours(1) },
    );

    // seed the admin outside of the benchmark
    rt.block_on(svc.bootstrap_admin("bench", "Benchmark1")).unwrap();

    c.bench_function("auth_login_verify", |b| {
        b.iter(|| {
            let session = rt.block_on(svc.login(LoginInput { username: "bench".into(), password: "Benchmark1".into() })).unwrap();
            rt.block_on(svc.verify(&session.token)).unwrap();
        });
    });
}

fn bench_csv_export(c: &mut Criterion) {
    let leads: Vec<Lead> = (0..1_000)
        .map(|i| Lead {
            id: i.to_string(),
            first_name: format!("Name \"{i}\""),
            email: format!("user{i}@example.com"),
            resource_id: "r1".into(),
            resource_title: "Budget Sheet".into(),
            timestamp: chrono::Utc::now(),
            has_consented: true,
        })
        .collect();

    c.bench_function("csv_export_1k", |b| {
        b.iter(|| export_signups("Budget Sheet", &leads).unwrap());
    });
}

criterion_group!(benches, bench_login, bench_csv_export);
criterion_main!(benches);
