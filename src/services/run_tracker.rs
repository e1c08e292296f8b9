//! 运行状态追踪服务 - 业务能力层
//!
//! 只负责分页游标的持久化与恢复，不关心流程
//!
//! ## 设计
//! - 状态按 (模式, 页大小) 维度各自独立：预览与写入互不干扰，
//!   中途更换页大小视为有意开启新序列
//! - 全量状态落在一个 JSON 文件中，进程重启后可恢复
//! - 保存走"临时文件 + 原子重命名"，避免写一半的状态文件
//! - 进程内并发运行通过异步互斥串行化读改写

use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{Mode, RunState};

/// 运行状态追踪器
pub struct RunTracker {
    state_file: PathBuf,
    states: Mutex<HashMap<String, RunState>>,
}

impl RunTracker {
    /// 从状态文件加载（文件不存在时从空表开始）
    pub async fn load(state_file: impl Into<PathBuf>) -> AppResult<Self> {
        let state_file = state_file.into();

        let states = if state_file.exists() {
            let content = fs::read_to_string(&state_file).await.map_err(|e| {
                AppError::tracker_load_failed(state_file.to_string_lossy().to_string(), e)
            })?;
            serde_json::from_str(&content).map_err(|e| {
                AppError::tracker_load_failed(state_file.to_string_lossy().to_string(), e)
            })?
        } else {
            debug!("状态文件不存在，从空状态开始: {}", state_file.display());
            HashMap::new()
        };

        Ok(Self {
            state_file,
            states: Mutex::new(states),
        })
    }

    /// 获取指定 (模式, 页大小) 的状态，不存在时初始化为第 1 页
    pub async fn get_or_init(&self, mode: Mode, page_size: u32) -> RunState {
        let mut states = self.states.lock().await;
        states
            .entry(RunState::key(mode, page_size))
            .or_insert_with(|| RunState::new(mode, page_size))
            .clone()
    }

    /// 保存状态并落盘
    ///
    /// 整个读改写持锁进行，保证并发运行不会互相覆盖进度
    pub async fn save(&self, state: &RunState) -> AppResult<()> {
        let mut states = self.states.lock().await;
        states.insert(RunState::key(state.mode, state.page_size), state.clone());

        let json = serde_json::to_string_pretty(&*states).map_err(|e| {
            AppError::tracker_persist_failed(self.state_file.to_string_lossy().to_string(), e)
        })?;

        // 先写临时文件再原子替换
        let tmp_file = self.state_file.with_extension("json.tmp");
        fs::write(&tmp_file, json).await.map_err(|e| {
            AppError::tracker_persist_failed(tmp_file.to_string_lossy().to_string(), e)
        })?;
        fs::rename(&tmp_file, &self.state_file).await.map_err(|e| {
            AppError::tracker_persist_failed(self.state_file.to_string_lossy().to_string(), e)
        })?;

        debug!(
            "状态已保存: {} -> 第 {} 页",
            RunState::key(state.mode, state.page_size),
            state.current_page
        );

        Ok(())
    }
}
