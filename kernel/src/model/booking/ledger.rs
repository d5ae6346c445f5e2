use derive_new::new;
use shared::error::{AppError, AppResult};

// 一人がひとつのイベントに予約できる座席数の上限
pub const SEAT_LIMIT_PER_USER: i32 = 2;

// 予約行から毎回再計算された座席使用量。
// イベント側にカウンタは持たない（カウンタのずれを構造的に防ぐため）
#[derive(Debug, Clone, Copy, new)]
pub struct SeatUsage {
    pub total_booked: i32,
    pub user_booked: i32,
}

pub fn validate_seat_count(seats: i32) -> AppResult<()> {
    if !(1..=SEAT_LIMIT_PER_USER).contains(&seats) {
        return Err(AppError::InvalidSeatCount(seats));
    }
    Ok(())
}

// 検査のみで状態は一切変更しない。永続化はアダプタ側が
// 同一トランザクション内で行う
pub fn validate_booking(usage: SeatUsage, capacity: i32, requested: i32) -> AppResult<()> {
    validate_seat_count(requested)?;

    if usage.total_booked + requested > capacity {
        return Err(AppError::CapacityExceeded);
    }

    // イベント全体の容量とは独立した、ユーザーごとの上限
    if usage.user_booked + requested > SEAT_LIMIT_PER_USER {
        return Err(AppError::SeatLimitExceeded {
            limit: SEAT_LIMIT_PER_USER,
            booked: usage.user_booked,
        });
    }

    Ok(())
}
