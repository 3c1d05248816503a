//! # Vector Search Integration Tests
//!
//! SQL-driven vector similarity scenarios plus the recall property of the
//! HNSW index against brute force on random data.

use ghostsql::{Database, DistanceMetric, Error, Executor, HnswIndex, Parser, QueryResult, Value, Vector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

struct Fixture {
    db: Database,
    _dir: TempDir,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().expect("failed to create temp directory");
    let db = Database::initialize_at(dir.path().join("data")).expect("failed to initialize");
    Fixture { db, _dir: dir }
}

fn exec(db: &Database, sql: &str) -> Result<QueryResult, Error> {
    Executor::new(db).execute(Parser::new(sql).parse()?)
}

fn exec_ok(db: &Database, sql: &str) -> QueryResult {
    exec(db, sql).unwrap_or_else(|e| panic!("statement failed: {sql}: {e}"))
}

fn vector_fixture() -> Fixture {
    let f = fixture();
    exec_ok(&f.db, "CREATE TABLE e (id INT, v VECTOR(4))");
    exec_ok(&f.db, "INSERT INTO e VALUES (1, [1, 0, 0, 0])");
    exec_ok(&f.db, "INSERT INTO e VALUES (2, [0, 1, 0, 0])");
    exec_ok(&f.db, "INSERT INTO e VALUES (3, [0.99, 0.01, 0, 0])");
    f
}

mod sql_scenarios {
    use super::*;

    #[test]
    fn indexed_cosine_search_returns_closest_first() {
        let f = vector_fixture();
        exec_ok(
            &f.db,
            "CREATE INDEX ex ON e USING HNSW (v) WITH (m=8, ef_construction=50)",
        );

        let result = exec_ok(
            &f.db,
            "SELECT id FROM e ORDER BY COSINE_DISTANCE(v, [1, 0, 0, 0]) LIMIT 2",
        );
        assert_eq!(result.columns, vec!["id", "_distance"]);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0]["id"], Value::Int(1));
        assert_eq!(result.rows[1]["id"], Value::Int(3));
        assert_eq!(result.rows[0]["_distance"], Value::Text("0.000000".into()));
    }

    #[test]
    fn brute_force_search_without_index() {
        let f = vector_fixture();
        let result = exec_ok(
            &f.db,
            "SELECT id FROM e ORDER BY COSINE_DISTANCE(v, [0, 1, 0, 0]) LIMIT 1",
        );
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0]["id"], Value::Int(2));
        assert_eq!(result.rows[0]["_distance"], Value::Text("0.000000".into()));
    }

    #[test]
    fn l2_search_orders_by_euclidean_distance() {
        let f = vector_fixture();
        let result = exec_ok(
            &f.db,
            "SELECT id FROM e ORDER BY L2_DISTANCE(v, [1, 0, 0, 0]) LIMIT 3",
        );
        let ids: Vec<Value> = result.rows.iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![Value::Int(1), Value::Int(3), Value::Int(2)]);
    }

    #[test]
    fn desc_reverses_the_order() {
        let f = vector_fixture();
        let result = exec_ok(
            &f.db,
            "SELECT id FROM e ORDER BY COSINE_DISTANCE(v, [1, 0, 0, 0]) DESC LIMIT 3",
        );
        assert_eq!(result.rows[0]["id"], Value::Int(2));
        assert_eq!(result.rows[2]["id"], Value::Int(1));
    }

    #[test]
    fn rows_without_the_vector_are_skipped_silently() {
        let f = vector_fixture();
        exec_ok(&f.db, "INSERT INTO e (id) VALUES (4)");

        let result = exec_ok(
            &f.db,
            "SELECT id FROM e ORDER BY COSINE_DISTANCE(v, [1, 0, 0, 0]) LIMIT 10",
        );
        assert_eq!(result.rows.len(), 3);
    }

    #[test]
    fn star_projection_gains_distance_column() {
        let f = vector_fixture();
        let result = exec_ok(
            &f.db,
            "SELECT * FROM e ORDER BY COSINE_DISTANCE(v, [1, 0, 0, 0]) LIMIT 1",
        );
        assert_eq!(result.columns, vec!["id", "v", "_distance"]);
        assert_eq!(result.rows[0]["id"], Value::Int(1));
        assert!(matches!(result.rows[0]["v"], Value::Vector(_)));
    }

    #[test]
    fn where_filter_applies_before_vector_search() {
        let f = vector_fixture();
        let result = exec_ok(
            &f.db,
            "SELECT id FROM e WHERE id != 1 ORDER BY COSINE_DISTANCE(v, [1, 0, 0, 0]) LIMIT 1",
        );
        assert_eq!(result.rows[0]["id"], Value::Int(3));
    }

    #[test]
    fn create_index_requires_vector_column() {
        let f = vector_fixture();
        assert!(matches!(
            exec(&f.db, "CREATE INDEX bad ON e USING HNSW (id)"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            exec(&f.db, "CREATE INDEX bad ON e USING HNSW (zzz)"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn drop_index_falls_back_to_brute_force() {
        let f = vector_fixture();
        exec_ok(&f.db, "CREATE INDEX ex ON e USING HNSW (v)");
        let result = exec_ok(&f.db, "DROP INDEX ex");
        assert_eq!(result.message.as_deref(), Some("DROP INDEX ex"));

        assert!(matches!(
            exec(&f.db, "DROP INDEX ex"),
            Err(Error::NotFound(_))
        ));

        let result = exec_ok(
            &f.db,
            "SELECT id FROM e ORDER BY COSINE_DISTANCE(v, [1, 0, 0, 0]) LIMIT 1",
        );
        assert_eq!(result.rows[0]["id"], Value::Int(1));
    }

    #[test]
    fn dimension_mismatch_on_insert_is_rejected() {
        let f = vector_fixture();
        assert!(matches!(
            exec(&f.db, "INSERT INTO e VALUES (9, [1, 2])"),
            Err(Error::InvalidArgument(_))
        ));
    }
}

mod recall {
    use super::*;

    fn random_vectors(rng: &mut StdRng, count: usize, dims: usize) -> Vec<Vector> {
        (0..count)
            .map(|_| Vector::new((0..dims).map(|_| rng.random::<f32>() - 0.5).collect()))
            .collect()
    }

    fn brute_force_top_k(
        vectors: &[Vector],
        query: &Vector,
        metric: DistanceMetric,
        k: usize,
    ) -> Vec<usize> {
        let mut scored: Vec<(usize, f64)> = vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, metric.distance(query, v).unwrap()))
            .collect();
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
        scored.into_iter().take(k).map(|(i, _)| i).collect()
    }

    fn average_recall(metric: DistanceMetric, seed: u64) -> f64 {
        const N: usize = 1000;
        const DIMS: usize = 16;
        const K: usize = 10;
        const QUERIES: usize = 20;
        const EF: usize = 200;

        let mut rng = StdRng::seed_from_u64(seed);
        let vectors = random_vectors(&mut rng, N, DIMS);

        let mut index = HnswIndex::new(16, 200, metric);
        for (i, v) in vectors.iter().enumerate() {
            index.insert(v.clone(), i).unwrap();
        }

        let queries = random_vectors(&mut rng, QUERIES, DIMS);
        let mut total = 0.0;
        for query in &queries {
            let expected = brute_force_top_k(&vectors, query, metric, K);
            let got: Vec<usize> = index
                .search(query, K, EF)
                .into_iter()
                .map(|hit| hit.row_id)
                .collect();
            let hits = expected.iter().filter(|id| got.contains(id)).count();
            total += hits as f64 / K as f64;
        }
        total / QUERIES as f64
    }

    #[test]
    fn cosine_recall_is_at_least_ninety_percent() {
        let recall = average_recall(DistanceMetric::Cosine, 7);
        assert!(recall >= 0.90, "cosine recall too low: {recall}");
    }

    #[test]
    fn l2_recall_is_at_least_ninety_percent() {
        let recall = average_recall(DistanceMetric::L2, 11);
        assert!(recall >= 0.90, "l2 recall too low: {recall}");
    }
}
