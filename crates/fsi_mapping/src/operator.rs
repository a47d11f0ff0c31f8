// crates/fsi_mapping/src/operator.rs

//! 传递算子
//!
//! 映射器构建的线性算子 `target = W · source`，三种存储形式：
//!
//! - `Gather`: 每个目标元素直接取一个源元素（直接映射）
//! - `Sparse`: CSR 格式的稀疏权重行（重叠映射）
//! - `Dense`: 稠密权重矩阵（径向基函数映射）

use nalgebra::DMatrix;

use crate::field::FieldValue;

/// CSR 格式稀疏行
#[derive(Debug, Clone, Default)]
pub struct SparseRows {
    /// 行偏移（长度 = 行数 + 1）
    pub offsets: Vec<usize>,
    /// 列编号（源元素）
    pub columns: Vec<usize>,
    /// 权重
    pub weights: Vec<f64>,
}

impl SparseRows {
    /// 从逐行的 (列, 权重) 列表构建
    pub fn from_rows(rows: Vec<Vec<(usize, f64)>>) -> Self {
        let nnz = rows.iter().map(Vec::len).sum();
        let mut offsets = Vec::with_capacity(rows.len() + 1);
        let mut columns = Vec::with_capacity(nnz);
        let mut weights = Vec::with_capacity(nnz);
        offsets.push(0);
        for row in rows {
            for (c, w) in row {
                columns.push(c);
                weights.push(w);
            }
            offsets.push(columns.len());
        }
        Self {
            offsets,
            columns,
            weights,
        }
    }

    /// 行数
    pub fn n_rows(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// 第 i 行
    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.offsets[i]..self.offsets[i + 1];
        self.columns[range.clone()]
            .iter()
            .copied()
            .zip(self.weights[range].iter().copied())
    }

    /// 第 i 行权重和
    pub fn row_sum(&self, i: usize) -> f64 {
        self.weights[self.offsets[i]..self.offsets[i + 1]].iter().sum()
    }
}

/// 传递算子
#[derive(Debug, Clone)]
pub enum TransferOperator {
    /// 收集：`target[i] = source[addr[i]]`
    Gather(Vec<usize>),
    /// 稀疏加权
    Sparse(SparseRows),
    /// 稠密加权（行 = 目标，列 = 源）
    Dense(DMatrix<f64>),
}

impl TransferOperator {
    /// 目标元素数
    pub fn n_targets(&self) -> usize {
        match self {
            Self::Gather(addr) => addr.len(),
            Self::Sparse(rows) => rows.n_rows(),
            Self::Dense(w) => w.nrows(),
        }
    }

    /// 作用于源场
    ///
    /// 调用方保证源场长度与算子列数一致。
    pub fn apply<T: FieldValue>(&self, source: &[T]) -> Vec<T> {
        match self {
            Self::Gather(addr) => addr.iter().map(|&j| source[j]).collect(),
            Self::Sparse(rows) => (0..rows.n_rows())
                .map(|i| {
                    rows.row(i)
                        .fold(T::zero(), |acc, (j, w)| acc + source[j] * w)
                })
                .collect(),
            Self::Dense(w) => (0..w.nrows())
                .map(|i| {
                    source
                        .iter()
                        .enumerate()
                        .fold(T::zero(), |acc, (j, v)| acc + *v * w[(i, j)])
                })
                .collect(),
        }
    }
}
