use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Semaphore;
use uuid::Uuid;

use vims_core::auth::{AuthContext, GuardDecision, InMemoryRoleSource, RouteGuard};
use vims_core::domains::demographics::{
    BucketOrder, DemographicReport, DemographicReportService, DemographicReportServiceImpl,
    GenderRatioMode, GenderTokens, ReportView,
};
use vims_core::domains::permission::{ADMIN_ONLY, MANAGEMENT};
use vims_core::domains::person::{
    Facet, FacetLookupSource, FilterCriteria, InMemoryPersonRepository, PersonRecord,
    PersonRecordSource, RecordInclusion,
};
use vims_core::errors::{DomainError, ServiceError, SourceError, SourceResult};
use vims_core::types::{PaginationParams, UserRole};

const FIXTURE: &str = r#"[
    {"id": 1, "date_of_birth": "2016-03-02", "gender": "M", "is_deceased": "No", "is_disabled": "No",
     "household": {"id": "H1", "household_number": "001"},
     "location": {"village": "Kyauk Taw", "township": "Hpa-an", "district": "Hpa-an", "state_region": "Kayin"}},
    {"id": 2, "date_of_birth": "2009-01-20", "gender": "F", "is_deceased": "No", "is_disabled": "Yes",
     "disability_type": "Visual",
     "household": {"id": "H1", "household_number": "001"},
     "location": {"village": "Kyauk Taw", "township": "Hpa-an", "district": "Hpa-an", "state_region": "Kayin"}},
    {"id": 3, "date_of_birth": "2015-05-30", "gender": "M", "is_deceased": "No", "is_disabled": "No",
     "household": {"id": "H2", "household_number": "002"},
     "location": {"village": "Ywa Thit", "township": "Hlaingbwe", "district": "Hpa-an", "state_region": "Kayin"}},
    {"id": 4, "date_of_birth": "1950-07-04", "gender": "F", "is_deceased": "Yes", "is_disabled": "Yes",
     "household": {"id": "H2", "household_number": "002"},
     "location": {"village": "Ywa Thit", "township": "Hlaingbwe", "district": "Hpa-an", "state_region": "Kayin"}},
    {"id": 5, "date_of_birth": "1948-11-11", "gender": "M", "is_deceased": "Yes", "is_disabled": "No",
     "location": {"village": "Kyauk Taw", "township": "Hpa-an"}},
    {"id": 6, "date_of_birth": "31/12/1980", "gender": "F", "is_deceased": "No", "is_disabled": "No",
     "household": {"id": "H3", "household_number": "003"},
     "location": {"village": "Naung Lone", "township": "Hpa-an"}},
    {"id": 7, "date_of_birth": "", "gender": "Other", "is_deceased": "No",
     "household": {"id": "H3", "household_number": "003"},
     "location": {"village": "Naung Lone", "township": "Hpa-an"}}
]"#;

fn records() -> Vec<PersonRecord> {
    serde_json::from_str(FIXTURE).unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn tokens() -> GenderTokens {
    GenderTokens::new("M", "F")
}

fn service() -> DemographicReportServiceImpl {
    let repo = Arc::new(InMemoryPersonRepository::new(records()));
    DemographicReportServiceImpl::new(repo.clone(), repo)
}

fn manager() -> AuthContext {
    AuthContext::new(Uuid::new_v4(), UserRole::Manager)
}

#[tokio::test]
async fn population_report_end_to_end() {
    let view = ReportView::population().with_gender_tokens(tokens());
    let report = service()
        .build_report(&view, &FilterCriteria::new(), today(), &manager())
        .await
        .unwrap();

    // Residents only: records 1, 2, 3, 6, 7
    assert_eq!(report.fetched_records, 5);
    assert_eq!(report.matched_records, 5);
    assert_eq!(report.skipped_records, 1);
    assert_eq!(report.buckets.total_members(), 4);

    let young = report.buckets.get("≤10").unwrap();
    assert_eq!(young.member_count, 2);
    assert_eq!(young.male_count, 2);
    assert_eq!(young.unique_household_count, 2);
    assert_eq!(young.average_age, 8.5);

    let teens = report.buckets.get("11-20").unwrap();
    assert_eq!(teens.member_count, 1);
    assert_eq!(teens.female_count, 1);
    assert_eq!(teens.average_age, 15.0);

    assert_eq!(report.buckets.get("41-50").unwrap().member_count, 1);
    assert_eq!(
        report.buckets.labels(),
        vec!["≤10", "11-20", "21-30", "31-40", "41-50", "51-60", "61-70", "≥71"]
    );

    assert_eq!(report.summary.total_population, 4);
    assert_eq!(report.summary.gender_ratio, [2, 2]);
    assert_eq!(report.summary.total_households, 4);
    assert_eq!(report.distinct_households, 3);

    assert_eq!(report.distributions.by_gender.get("Other"), 1);
    assert_eq!(report.distributions.by_disability_type.get("Visual"), 1);
    assert_eq!(report.facet_options.villages, vec!["Kyauk Taw", "Naung Lone", "Ywa Thit"]);
    assert_eq!(report.facet_options.death_statuses, vec!["No", "Yes"]);
}

#[tokio::test]
async fn death_report_orders_by_member_count() {
    let view = ReportView::death().with_gender_tokens(tokens());
    let report = service()
        .build_report(&view, &FilterCriteria::new(), today(), &manager())
        .await
        .unwrap();

    assert_eq!(report.matched_records, 2);
    assert_eq!(report.buckets.labels()[0], "≥71");
    assert_eq!(report.buckets.get("≥71").unwrap().member_count, 2);
    // Remaining empty buckets keep their configured order
    assert_eq!(report.buckets.labels()[1], "≤10");
    assert_eq!(report.charts.len(), 3);
    assert_eq!(report.charts[0].values[0], 2.0);
}

#[tokio::test]
async fn disability_report_counts_living_and_deceased() {
    let view = ReportView::disability()
        .with_gender_tokens(tokens())
        .with_gender_ratio(GenderRatioMode::TotalMinusFemale);
    let report = service()
        .build_report(&view, &FilterCriteria::new(), today(), &manager())
        .await
        .unwrap();

    assert_eq!(report.matched_records, 2);
    assert_eq!(report.summary.gender_ratio, [0, 2]);
    assert_eq!(report.distributions.by_disability_type.get("Unspecified"), 1);
    assert_eq!(report.distributions.by_death_status.get("Yes"), 1);
}

#[tokio::test]
async fn search_and_facets_narrow_the_report() {
    let view = ReportView::population()
        .with_gender_tokens(tokens())
        .with_bucket_order(BucketOrder::Configured);

    let criteria = FilterCriteria::new().with_query("kyauk").with_gender("m");
    let report = service()
        .build_report(&view, &criteria, today(), &manager())
        .await
        .unwrap();
    assert_eq!(report.matched_records, 1);
    assert_eq!(report.buckets.get("≤10").unwrap().member_count, 1);

    let criteria = FilterCriteria::from_pairs([("township", "Hlaingbwe"), ("village", "Ywa Thit")]).unwrap();
    let report = service()
        .build_report(&view, &criteria, today(), &manager())
        .await
        .unwrap();
    assert_eq!(report.matched_records, 1);
    assert_eq!(report.distinct_households, 1);
}

#[tokio::test]
async fn invalid_criteria_fail_before_fetching() {
    let criteria = FilterCriteria::new().with_query(&"x".repeat(500));
    let result = service()
        .build_report(&ReportView::population(), &criteria, today(), &manager())
        .await;
    assert!(matches!(result, Err(ServiceError::Domain(DomainError::Validation(_)))));
}

#[tokio::test]
async fn list_records_returns_requested_page() {
    let page = service()
        .list_records(
            &ReportView::population(),
            &FilterCriteria::new().with_township("Hpa-an"),
            PaginationParams::new(1, 3),
            &manager(),
        )
        .await
        .unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(page.total_pages, 2);
    let ids: Vec<i64> = page.items.iter().filter_map(|r| r.id.as_int()).collect();
    assert_eq!(ids, vec![1, 2, 6]);
}

#[tokio::test]
async fn access_is_role_gated() {
    let staff = AuthContext::new(Uuid::new_v4(), UserRole::Staff);
    let service = service();

    assert!(service
        .build_report(&ReportView::population(), &FilterCriteria::new(), today(), &staff)
        .await
        .is_ok());
    assert!(matches!(
        service
            .build_report(&ReportView::disability(), &FilterCriteria::new(), today(), &staff)
            .await,
        Err(ServiceError::PermissionDenied(_))
    ));

    let no_role = AuthContext::without_role(Uuid::new_v4());
    assert!(service.load_facets(&no_role).await.is_err());
    assert!(service.load_facets(&staff).await.is_ok());

    let admin_view = ReportView::population().with_required_roles(&ADMIN_ONLY);
    assert!(service
        .build_report(&admin_view, &FilterCriteria::new(), today(), &manager())
        .await
        .is_err());
}

#[tokio::test]
async fn route_guard_uses_role_source() {
    let roles = Arc::new(InMemoryRoleSource::new());
    let manager_id = Uuid::new_v4();
    roles.set_role(manager_id, "manager").unwrap();
    let guard = RouteGuard::new(roles);

    match guard.check(Some(manager_id), &MANAGEMENT).await {
        GuardDecision::Allow(ctx) => assert_eq!(ctx.role, Some(UserRole::Manager)),
        other => panic!("expected access, got {:?}", other),
    }
    assert!(!guard.check(Some(manager_id), &ADMIN_ONLY).await.is_allowed());
    assert!(!guard.check(None, &MANAGEMENT).await.is_allowed());
}

struct UnavailableSource;

#[async_trait]
impl PersonRecordSource for UnavailableSource {
    async fn fetch_records(&self, _inclusion: RecordInclusion) -> SourceResult<Vec<PersonRecord>> {
        Err(SourceError::Fetch("timeout".to_string()))
    }
}

#[async_trait]
impl FacetLookupSource for UnavailableSource {
    async fn distinct_values(&self, facet: Facet) -> SourceResult<Vec<String>> {
        Err(SourceError::NotFound("lookup".to_string(), facet.to_string()))
    }
}

#[tokio::test]
async fn source_errors_propagate() {
    let source = Arc::new(UnavailableSource);
    let service = DemographicReportServiceImpl::new(source.clone(), source);
    let result = service
        .build_report(&ReportView::population(), &FilterCriteria::new(), today(), &manager())
        .await;
    assert!(matches!(result, Err(ServiceError::Domain(DomainError::Source(_)))));

    let facets = service.load_facets(&manager()).await;
    assert!(matches!(
        facets,
        Err(ServiceError::Domain(DomainError::Source(SourceError::NotFound(_, _))))
    ));
}

/// Record source that holds each fetch until a permit is released
struct GatedSource {
    inner: InMemoryPersonRepository,
    gate: Semaphore,
}

impl GatedSource {
    fn new() -> Self {
        Self {
            inner: InMemoryPersonRepository::new(records()),
            gate: Semaphore::new(0),
        }
    }
}

#[async_trait]
impl PersonRecordSource for GatedSource {
    async fn fetch_records(&self, inclusion: RecordInclusion) -> SourceResult<Vec<PersonRecord>> {
        self.gate
            .acquire()
            .await
            .map_err(|e| SourceError::Unavailable(e.to_string()))?
            .forget();
        self.inner.fetch_records(inclusion).await
    }
}

#[async_trait]
impl FacetLookupSource for GatedSource {
    async fn distinct_values(&self, facet: Facet) -> SourceResult<Vec<String>> {
        self.inner.distinct_values(facet).await
    }
}

fn spawn_tracked(
    service: &Arc<DemographicReportServiceImpl>,
    view: &ReportView,
    criteria: FilterCriteria,
) -> tokio::task::JoinHandle<Result<Option<DemographicReport>, ServiceError>> {
    let service = service.clone();
    let view = view.clone();
    tokio::spawn(async move {
        service.build_tracked_report(&view, &criteria, today(), &manager()).await
    })
}

async fn wait_until_started(service: &DemographicReportServiceImpl, view: &ReportView) {
    while service.tracker().current_generation(&view.title) < 1 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn stale_report_is_discarded() {
    let source = Arc::new(GatedSource::new());
    let service = Arc::new(DemographicReportServiceImpl::new(source.clone(), source.clone()));
    let view = ReportView::population().with_gender_tokens(tokens());

    let first = spawn_tracked(&service, &view, FilterCriteria::new().with_township("Hpa-an"));
    wait_until_started(&service, &view).await;

    // A newer request supersedes the first while it is still waiting on the source
    let criteria = FilterCriteria::new().with_township("Hlaingbwe");
    let second_tag = service.tracker().begin(&view.title, &criteria);

    source.gate.add_permits(1);
    let stale = first.await.unwrap().unwrap();
    assert!(stale.is_none());
    assert!(service.tracker().is_current(&second_tag));
}

#[tokio::test]
async fn concurrent_views_do_not_discard_each_other() {
    let source = Arc::new(GatedSource::new());
    let service = Arc::new(DemographicReportServiceImpl::new(source.clone(), source.clone()));
    let population = ReportView::population().with_gender_tokens(tokens());
    let death = ReportView::death().with_gender_tokens(tokens());

    let population_task = spawn_tracked(&service, &population, FilterCriteria::new());
    let death_task = spawn_tracked(&service, &death, FilterCriteria::new());
    wait_until_started(&service, &population).await;
    wait_until_started(&service, &death).await;

    source.gate.add_permits(2);
    let population_report = population_task.await.unwrap().unwrap();
    let death_report = death_task.await.unwrap().unwrap();

    assert_eq!(population_report.map(|r| r.matched_records), Some(5));
    assert_eq!(death_report.map(|r| r.matched_records), Some(2));
}
