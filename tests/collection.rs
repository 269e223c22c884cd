//! Collection behaviour against the in-memory ECS
//!
//! Population: three instances, two of them stopped.

mod common;

use alicloud_resource::{Error, Instance};
use common::{FakeEcs, STOPPING_ID};
use futures::TryStreamExt;
use serde_json::json;

fn ids(instances: &[Instance]) -> Vec<String> {
    instances.iter().map(|i| i.id().to_string()).collect()
}

#[tokio::test]
async fn test_all_returns_every_instance() {
    let fake = FakeEcs::scenario();
    let all = fake.resource().instances().all().fetch_all().await.unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn test_filter_by_status() {
    let fake = FakeEcs::scenario();
    let stopped = fake
        .resource()
        .instances()
        .filter([("Status", "Stopped")])
        .unwrap()
        .fetch_all()
        .await
        .unwrap();
    assert_eq!(stopped.len(), 2);
}

#[tokio::test]
async fn test_filter_by_instance_id() {
    let fake = FakeEcs::scenario();
    let instances = fake.resource().instances();

    let one = instances
        .filter([("InstanceId", STOPPING_ID)])
        .unwrap()
        .fetch_all()
        .await
        .unwrap();
    assert_eq!(ids(&one), [STOPPING_ID]);

    let none = instances
        .filter([("InstanceId", "11111111111")])
        .unwrap()
        .fetch_all()
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_filter_does_not_touch_network() {
    let fake = FakeEcs::scenario();
    let _narrowed = fake
        .resource()
        .instances()
        .filter([("Status", "Stopped")])
        .unwrap()
        .limit(1)
        .unwrap()
        .page_size(1)
        .unwrap();
    assert_eq!(fake.list_calls(), 0);
}

#[tokio::test]
async fn test_unrecognized_filter_key() {
    let fake = FakeEcs::scenario();
    let err = fake
        .resource()
        .instances()
        .filter([("Colour", "blue")])
        .unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("DescribeInstances"));
}

#[tokio::test]
async fn test_limit_one() {
    let fake = FakeEcs::scenario();
    let limited = fake
        .resource()
        .instances()
        .limit(1)
        .unwrap()
        .fetch_all()
        .await
        .unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(fake.list_calls(), 1);
}

#[tokio::test]
async fn test_invalid_limit() {
    let fake = FakeEcs::scenario();
    let instances = fake.resource().instances();

    for bad in [json!("hi"), json!(-10.5), json!(0), json!(-3)] {
        let err = instances.limit(bad).unwrap_err();
        assert!(matches!(err, Error::InvalidParam { name: "limit" }));
        assert_eq!(err.to_string(), "The params of limit must be positive integers");
    }
    assert_eq!(fake.list_calls(), 0);
}

#[tokio::test]
async fn test_invalid_page_size() {
    let fake = FakeEcs::scenario();
    let instances = fake.resource().instances();

    for bad in [json!("hi"), json!("-10.5"), json!(0), json!(1.5)] {
        let err = instances.page_size(bad).unwrap_err();
        assert_eq!(err.to_string(), "The params of page_size must be positive integers");
    }
    assert_eq!(fake.list_calls(), 0);
}

#[tokio::test]
async fn test_page_size_one_fetches_every_page() {
    let fake = FakeEcs::scenario();
    let all = fake
        .resource()
        .instances()
        .page_size(1)
        .unwrap()
        .fetch_all()
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(fake.list_calls(), 3);
}

#[tokio::test]
async fn test_pages_with_default_page_size() {
    let fake = FakeEcs::scenario();
    let pages: Vec<Vec<Instance>> = fake
        .resource()
        .instances()
        .pages()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].len(), 3);
}

#[tokio::test]
async fn test_pages_of_one() {
    let fake = FakeEcs::scenario();
    let pages: Vec<Vec<Instance>> = fake
        .resource()
        .instances()
        .page_size(1)
        .unwrap()
        .pages()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(pages.len(), 3);
    assert!(pages.iter().all(|page| page.len() == 1));
}

#[tokio::test]
async fn test_iterating_twice_restarts() {
    let fake = FakeEcs::scenario();
    let collection = fake.resource().instances().page_size(2).unwrap();

    let first = collection.fetch_all().await.unwrap();
    let second = collection.fetch_all().await.unwrap();
    assert_eq!(ids(&first), ids(&second));
    assert_eq!(fake.list_calls(), 4);
}

#[tokio::test]
async fn test_stream_is_lazy() {
    let fake = FakeEcs::scenario();
    let collection = fake.resource().instances().page_size(1).unwrap();

    let mut stream = collection.stream();
    assert_eq!(fake.list_calls(), 0);

    let first = stream.try_next().await.unwrap().unwrap();
    assert_eq!(first.id(), STOPPING_ID);
    assert_eq!(fake.list_calls(), 1);
}

#[tokio::test]
async fn test_fetch_page_reports_page_number() {
    let fake = FakeEcs::scenario();
    let page = fake.resource().instances().fetch_page(1).await.unwrap();
    assert_eq!(page.page_number, 1);
    assert_eq!(page.total_count, Some(3));
}

#[tokio::test]
async fn test_display_is_tagged() {
    let fake = FakeEcs::scenario();
    let rendered = fake.resource().instances().to_string();
    assert!(rendered.starts_with("<ResourceCollection"));
}
