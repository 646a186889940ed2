use std::collections::VecDeque;

use crate::types::Timestamped;

/// 固定容量的滑动窗口，按到达顺序保存最近的样本
///
/// Appending pushes to the back and evicts from the front once the window is
/// over capacity, so each append past capacity drops exactly the oldest
/// sample. The visible domain is recomputed after every append and always
/// names the first and last timestamps currently held.
#[derive(Debug, Clone)]
pub struct SlidingWindow<T> {
    samples: VecDeque<T>,
    capacity: usize,
    visible_domain: Option<(i64, i64)>,
}

impl<T: Timestamped> SlidingWindow<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity + 1),
            capacity,
            visible_domain: None,
        }
    }

    pub fn append(&mut self, sample: T) {
        // 将新数据添加到缓冲区末尾
        self.samples.push_back(sample);

        // 如果超过最大样本数，移除最旧的数据（从前面移除）- O(1)操作
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }

        self.visible_domain = match (self.samples.front(), self.samples.back()) {
            (Some(first), Some(last)) => Some((first.timestamp_ms(), last.timestamp_ms())),
            _ => None,
        };
    }

    pub fn samples(&self) -> &VecDeque<T> {
        &self.samples
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<&T> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 图表 x 轴范围 `[最旧, 最新]`，空窗口时为 None
    pub fn visible_domain(&self) -> Option<(i64, i64)> {
        self.visible_domain
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.visible_domain = None;
    }
}
