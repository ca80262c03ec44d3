// ==========================================
// 维修门店分析驾驶舱 - 维修记录 API
// ==========================================
// 职责: 维修记录的新建/查询/列表/修改/删除
// 规则: 见 engine::repair_rules
// 并发: 修改/删除使用带守卫条件的单语句写入；
//       影响行数为 0 时重读守卫状态，区分 不存在/规则冲突/修改未生效
// ==========================================

use std::sync::Arc;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::resolve_positive;
use crate::config::constants::limits;
use crate::domain::analytics::RepairList;
use crate::domain::repair::{RepairDetail, RepairDraft, RepairPatch};
use crate::engine::clock::Clock;
use crate::engine::repair_rules::{
    check_delete_allowed, check_update_allowed, validate_new_repair, validate_patch, RuleViolation,
};
use crate::repository::repair_repo::RepairRepository;

const ENTITY: &str = "维修记录";

// ==========================================
// RepairApi - 维修记录 API
// ==========================================
pub struct RepairApi {
    repo: Arc<dyn RepairRepository>,
    clock: Arc<dyn Clock>,
}

impl RepairApi {
    pub fn new(repo: Arc<dyn RepairRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// 新建维修记录
    ///
    /// # 返回
    /// - Ok(i64): 新记录的 operation_id
    /// - Err(ValidationError): 必填缺失/日期格式/负数费用
    /// - Err(BusinessRuleViolation): 补录历史日期
    pub async fn create(&self, draft: RepairDraft) -> ApiResult<i64> {
        let today = self.clock.today();
        let repair = validate_new_repair(&draft, today).map_err(|violation| {
            warn!(%violation, "维修记录新建被拒绝");
            ApiError::from(violation)
        })?;

        let operation_date = repair.operation_date;
        let operation_id = self.repo.insert(repair).await?;

        info!(operation_id, %operation_date, "维修记录已创建");
        Ok(operation_id)
    }

    /// 查询单条维修记录
    pub async fn get(&self, operation_id: i64) -> ApiResult<RepairDetail> {
        self.repo
            .find_by_id(operation_id)
            .await?
            .ok_or_else(|| not_found(operation_id))
    }

    /// 最近维修记录列表
    ///
    /// # 参数
    /// - limit: 返回条数（缺省 50，范围 1..=500）
    pub async fn list(&self, limit: Option<i64>) -> ApiResult<RepairList> {
        let limit = resolve_positive("limit", limit, limits::REPAIRS, limits::MAX_LIST)?;
        let data = self.repo.list_recent(limit).await?;
        Ok(RepairList {
            total: data.len(),
            data,
        })
    }

    /// 修改维修记录（部分字段）
    ///
    /// 冻结判定先于载荷校验：挂有严重异常的记录无论载荷如何均拒绝
    pub async fn update(&self, operation_id: i64, patch: RepairPatch) -> ApiResult<()> {
        let guard = self.repo.mutation_guard(operation_id).await?;
        match check_update_allowed(operation_id, guard) {
            None => return Err(not_found(operation_id)),
            Some(Err(violation)) => {
                warn!(operation_id, %violation, "维修记录修改被拒绝");
                return Err(violation.into());
            }
            Some(Ok(())) => {}
        }

        validate_patch(&patch)?;

        let affected = self.repo.update_unfrozen(operation_id, patch).await?;
        if affected == 0 {
            // 检查与写入之间状态变化（记录被删除或新增严重异常）
            let guard = self.repo.mutation_guard(operation_id).await?;
            return Err(classify_zero_rows(
                operation_id,
                check_update_allowed(operation_id, guard),
            ));
        }

        info!(operation_id, "维修记录已更新");
        Ok(())
    }

    /// 删除维修记录（已标记维修成功的记录禁止删除）
    pub async fn delete(&self, operation_id: i64) -> ApiResult<()> {
        let guard = self.repo.mutation_guard(operation_id).await?;
        match check_delete_allowed(operation_id, guard) {
            None => return Err(not_found(operation_id)),
            Some(Err(violation)) => {
                warn!(operation_id, %violation, "维修记录删除被拒绝");
                return Err(violation.into());
            }
            Some(Ok(())) => {}
        }

        let affected = self.repo.delete_unsuccessful(operation_id).await?;
        if affected == 0 {
            let guard = self.repo.mutation_guard(operation_id).await?;
            return Err(classify_zero_rows(
                operation_id,
                check_delete_allowed(operation_id, guard),
            ));
        }

        info!(operation_id, "维修记录已删除");
        Ok(())
    }
}

fn not_found(operation_id: i64) -> ApiError {
    ApiError::NotFound(format!("{}(id={})不存在", ENTITY, operation_id))
}

/// 守卫写入影响 0 行后的原因判定
fn classify_zero_rows(
    operation_id: i64,
    recheck: Option<Result<(), RuleViolation>>,
) -> ApiError {
    match recheck {
        None => not_found(operation_id),
        Some(Err(violation)) => {
            warn!(operation_id, %violation, "并发状态变化导致写入被守卫拦截");
            violation.into()
        }
        Some(Ok(())) => ApiError::ModificationFailed(format!(
            "{}(id={})未发生变更",
            ENTITY, operation_id
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repair::{MutationGuard, NewRepair, RepairSummary};
    use crate::engine::clock::FixedClock;
    use crate::repository::error::RepositoryResult;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 18).unwrap()
    }

    /// 守卫状态按调用顺序依次返回，用于模拟检查与写入之间的并发变化
    #[derive(Default)]
    struct StubRepo {
        guards: Mutex<VecDeque<MutationGuard>>,
        affected: usize,
        inserted: Mutex<Vec<NewRepair>>,
        writes: Mutex<usize>,
    }

    impl StubRepo {
        fn with_guards(guards: Vec<MutationGuard>, affected: usize) -> Self {
            Self {
                guards: Mutex::new(guards.into()),
                affected,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl RepairRepository for StubRepo {
        async fn insert(&self, repair: NewRepair) -> RepositoryResult<i64> {
            let mut inserted = self.inserted.lock().unwrap();
            inserted.push(repair);
            Ok(inserted.len() as i64)
        }

        async fn find_by_id(&self, _operation_id: i64) -> RepositoryResult<Option<RepairDetail>> {
            Ok(None)
        }

        async fn list_recent(&self, _limit: i64) -> RepositoryResult<Vec<RepairSummary>> {
            Ok(Vec::new())
        }

        async fn mutation_guard(&self, _operation_id: i64) -> RepositoryResult<MutationGuard> {
            Ok(self
                .guards
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(MutationGuard::Missing))
        }

        async fn update_unfrozen(&self, _id: i64, _patch: RepairPatch) -> RepositoryResult<usize> {
            *self.writes.lock().unwrap() += 1;
            Ok(self.affected)
        }

        async fn delete_unsuccessful(&self, _id: i64) -> RepositoryResult<usize> {
            *self.writes.lock().unwrap() += 1;
            Ok(self.affected)
        }
    }

    fn api(repo: Arc<StubRepo>) -> RepairApi {
        RepairApi::new(repo, Arc::new(FixedClock::new(today())))
    }

    const OPEN: MutationGuard = MutationGuard::Present {
        successful: false,
        frozen: false,
    };
    const FROZEN: MutationGuard = MutationGuard::Present {
        successful: false,
        frozen: true,
    };
    const DONE: MutationGuard = MutationGuard::Present {
        successful: true,
        frozen: false,
    };

    fn draft(date: &str) -> RepairDraft {
        RepairDraft {
            model_id: Some(1),
            service_id: Some(1),
            part_id: Some(1),
            operation_date: Some(date.to_string()),
            service_cost: Some(1000.0),
            if_repair_successful: None,
        }
    }

    #[tokio::test]
    async fn test_create_今天通过_昨天拒绝() {
        let repo = Arc::new(StubRepo::default());
        let id = api(repo.clone()).create(draft("2025-01-18")).await.unwrap();
        assert_eq!(id, 1);

        let err = api(repo.clone()).create(draft("2025-01-17")).await.unwrap_err();
        assert!(matches!(err, ApiError::BusinessRuleViolation(_)));

        let err = api(repo.clone())
            .create(RepairDraft::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));

        assert_eq!(repo.inserted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_不存在() {
        let repo = Arc::new(StubRepo::default());
        let err = api(repo).get(7).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_limit_越界() {
        let repo = Arc::new(StubRepo::default());
        let list = api(repo.clone()).list(None).await.unwrap();
        assert_eq!(list.total, 0);
        let err = api(repo).list(Some(501)).await.unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_update_冻结优先于载荷校验() {
        let repo = Arc::new(StubRepo::with_guards(vec![FROZEN], 1));
        let patch = RepairPatch {
            service_cost: Some(-5.0),
            ..Default::default()
        };
        let err = api(repo.clone()).update(3, patch).await.unwrap_err();
        assert!(matches!(err, ApiError::BusinessRuleViolation(_)));
        assert_eq!(*repo.writes.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_负数载荷() {
        let repo = Arc::new(StubRepo::with_guards(vec![OPEN], 1));
        let patch = RepairPatch {
            service_time: Some(-1),
            ..Default::default()
        };
        let err = api(repo.clone()).update(3, patch).await.unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
        assert_eq!(*repo.writes.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_写入时被并发冻结() {
        // 检查时未冻结，写入影响 0 行，重读发现已冻结
        let repo = Arc::new(StubRepo::with_guards(vec![OPEN, FROZEN], 0));
        let err = api(repo).update(3, RepairPatch::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::BusinessRuleViolation(_)));
    }

    #[tokio::test]
    async fn test_update_影响0行且状态未变() {
        let repo = Arc::new(StubRepo::with_guards(vec![OPEN, OPEN], 0));
        let err = api(repo).update(3, RepairPatch::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::ModificationFailed(_)));
    }

    #[tokio::test]
    async fn test_delete_规则() {
        let repo = Arc::new(StubRepo::with_guards(vec![DONE], 1));
        let err = api(repo).delete(3).await.unwrap_err();
        assert!(matches!(err, ApiError::BusinessRuleViolation(_)));

        let repo = Arc::new(StubRepo::with_guards(vec![OPEN], 1));
        api(repo.clone()).delete(3).await.unwrap();
        assert_eq!(*repo.writes.lock().unwrap(), 1);

        let repo = Arc::new(StubRepo::with_guards(vec![], 1));
        let err = api(repo).delete(3).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_写入前记录被并发删除() {
        let repo = Arc::new(StubRepo::with_guards(vec![OPEN, MutationGuard::Missing], 0));
        let err = api(repo).delete(3).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
