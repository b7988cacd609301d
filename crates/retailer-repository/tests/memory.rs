use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use futures::{StreamExt, TryStreamExt};
use retailer_repository::{
    InMemoryRepository, NewRetailerRecord, RetailerFilter, RetailerRecord, RetailerRepository,
};

fn visit(employee: &str, visited: Option<DateTime<Utc>>) -> NewRetailerRecord {
    NewRetailerRecord {
        employee_name: employee.to_string(),
        retailer_name: "ShopCo".to_string(),
        visiting_date_time: visited,
        onboarding_status: "Yes".to_string(),
        ..Default::default()
    }
}

async fn collect(
    repo: &InMemoryRepository,
    filter: &RetailerFilter,
) -> Result<Vec<RetailerRecord>> {
    Ok(repo.query(filter).try_collect().await?)
}

#[tokio::test]
async fn identical_inserts_produce_distinct_records() -> Result<()> {
    let repo = InMemoryRepository::new();
    let record = visit("Asha", None);

    let first = repo.insert(&record).await?;
    let second = repo.insert(&record).await?;

    assert_ne!(first, second);
    assert_eq!(repo.len().await, 2);

    let all = collect(&repo, &RetailerFilter::default()).await?;
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|stored| stored.data == record));
    Ok(())
}

#[tokio::test]
async fn date_bound_excludes_records_without_visit_time() -> Result<()> {
    let repo = InMemoryRepository::new();
    let visited = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
    repo.insert(&visit("Asha", Some(visited))).await?;
    repo.insert(&visit("Asha", None)).await?;

    let lower_only = RetailerFilter {
        visited_from: Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()),
        ..Default::default()
    };
    let matched = collect(&repo, &lower_only).await?;
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].data.visiting_date_time, Some(visited));

    let upper_only = RetailerFilter {
        visited_to: Some(Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap()),
        ..Default::default()
    };
    assert!(collect(&repo, &upper_only).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn employee_filter_is_case_insensitive_substring() -> Result<()> {
    let repo = InMemoryRepository::new();
    repo.insert(&visit("Rajesh Kumar", None)).await?;
    repo.insert(&visit("Asha", None)).await?;

    let filter = RetailerFilter {
        employee_name_contains: Some("raj".to_string()),
        ..Default::default()
    };
    let matched = collect(&repo, &filter).await?;

    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].data.employee_name, "Rajesh Kumar");
    Ok(())
}

#[tokio::test]
async fn open_query_does_not_block_inserts() -> Result<()> {
    let repo = InMemoryRepository::new();
    repo.insert(&visit("Asha", None)).await?;
    repo.insert(&visit("Rajesh Kumar", None)).await?;

    let filter = RetailerFilter::default();
    let mut stream = repo.query(&filter);
    let first = stream.next().await.transpose()?;
    assert!(first.is_some());

    repo.insert(&visit("Meena", None)).await?;
    let rest: Vec<RetailerRecord> = stream.try_collect().await?;

    assert_eq!(rest.len(), 1);
    assert_eq!(repo.len().await, 3);
    Ok(())
}
