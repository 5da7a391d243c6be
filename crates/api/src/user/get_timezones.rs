use crate::shared::usecase::UseCase;
use study_planner_domain::valid_timezones;
use study_planner_infra::PlannerContext;

/// Every timezone identifier a user can pick
#[derive(Debug, Default)]
pub struct GetTimezonesUseCase {}

#[derive(Debug)]
pub enum UseCaseErrors {}

#[async_trait::async_trait]
impl UseCase for GetTimezonesUseCase {
    type Response = Vec<&'static str>;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "GetTimezones";

    async fn execute(&mut self, _ctx: &PlannerContext) -> Result<Self::Response, Self::Errors> {
        Ok(valid_timezones())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::setup_context;
    use chrono::prelude::*;

    #[tokio::test]
    async fn every_listed_timezone_resolves() {
        let (ctx, _) = setup_context(Utc::now());
        let timezones = GetTimezonesUseCase::default().execute(&ctx).await.unwrap();
        assert!(timezones.contains(&"America/New_York"));
        assert!(timezones.contains(&"UTC"));
        assert!(timezones.iter().all(|tz| ctx.timezones.is_valid(tz)));
    }
}
