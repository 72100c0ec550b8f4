//! Notification emails via AWS SES
//!
//! All senders are fire-and-forget from the caller's point of view: a failed
//! notification is logged, never allowed to fail or roll back the domain
//! transition that triggered it.

use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use rust_decimal::Decimal;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

async fn send_plain(
    ses: &SesClient,
    from: &str,
    to: &str,
    subject: &str,
    body_text: String,
) -> Result<(), BoxError> {
    let subject = Content::builder().data(subject).build()?;

    let body = Body::builder()
        .text(Content::builder().data(body_text).build()?)
        .build();

    let message = Message::builder().subject(subject).body(body).build();

    ses.send_email()
        .from_email_address(from)
        .destination(Destination::builder().to_addresses(to).build())
        .content(EmailContent::builder().simple(message).build())
        .send()
        .await?;

    Ok(())
}

pub async fn send_booking_confirmed(
    ses: &SesClient,
    from: &str,
    to: &str,
    booking_id: i64,
    check_in_token: &str,
) -> Result<(), BoxError> {
    let body_text = format!(
        "Đặt phòng #{booking_id} của bạn đã được xác nhận.\n\
         Mã nhận phòng: {check_in_token}\n\n\
         Your booking #{booking_id} has been confirmed.\n\
         Check-in code: {check_in_token}"
    );

    send_plain(
        ses,
        from,
        to,
        "Đặt phòng đã xác nhận / Booking confirmed",
        body_text,
    )
    .await?;

    tracing::info!(to = to, booking_id, "Booking confirmed email sent");
    Ok(())
}

pub async fn send_host_new_booking(
    ses: &SesClient,
    from: &str,
    to: &str,
    booking_id: i64,
    condotel_name: &str,
) -> Result<(), BoxError> {
    let body_text = format!(
        "Căn hộ \"{condotel_name}\" của bạn vừa có đặt phòng #{booking_id} được thanh toán.\n\n\
         Your unit \"{condotel_name}\" has a new paid booking #{booking_id}."
    );

    send_plain(
        ses,
        from,
        to,
        "Đặt phòng mới / New paid booking",
        body_text,
    )
    .await?;

    tracing::info!(to = to, booking_id, "Host booking notification sent");
    Ok(())
}

/// Sent when a booking is cancelled at confirmation time because the unit
/// was confirmed to someone else first. A refund request already exists.
pub async fn send_booking_conflict_cancelled(
    ses: &SesClient,
    from: &str,
    to: &str,
    booking_id: i64,
) -> Result<(), BoxError> {
    let body_text = format!(
        "Rất tiếc, đặt phòng #{booking_id} đã bị hủy vì căn hộ vừa được xác nhận \
         cho một khách khác. Khoản thanh toán của bạn sẽ được hoàn lại.\n\n\
         Unfortunately booking #{booking_id} was cancelled because the unit was \
         confirmed to another guest first. Your payment will be refunded."
    );

    send_plain(
        ses,
        from,
        to,
        "Đặt phòng bị hủy / Booking cancelled",
        body_text,
    )
    .await?;

    tracing::info!(to = to, booking_id, "Conflict cancellation email sent");
    Ok(())
}

pub async fn send_refund_settled(
    ses: &SesClient,
    from: &str,
    to: &str,
    booking_id: i64,
    amount: Decimal,
) -> Result<(), BoxError> {
    let body_text = format!(
        "Yêu cầu hoàn tiền cho đặt phòng #{booking_id} đã được xử lý.\n\
         Số tiền: {amount} VND.\n\n\
         Your refund for booking #{booking_id} has been processed.\n\
         Amount: {amount} VND."
    );

    send_plain(
        ses,
        from,
        to,
        "Hoàn tiền đã xử lý / Refund processed",
        body_text,
    )
    .await?;

    tracing::info!(to = to, booking_id, "Refund settled email sent");
    Ok(())
}

pub async fn send_refund_rejected(
    ses: &SesClient,
    from: &str,
    to: &str,
    booking_id: i64,
    reason: &str,
    can_resubmit: bool,
) -> Result<(), BoxError> {
    let resubmit_note = if can_resubmit {
        "Bạn có thể gửi lại yêu cầu một lần nữa.\n\
         You may resubmit the request one more time."
    } else {
        "Yêu cầu này không thể gửi lại.\n\
         This request can no longer be resubmitted."
    };

    let body_text = format!(
        "Yêu cầu hoàn tiền cho đặt phòng #{booking_id} đã bị từ chối.\n\
         Lý do: {reason}\n\
         {resubmit_note}\n\n\
         Your refund request for booking #{booking_id} was rejected.\n\
         Reason: {reason}"
    );

    send_plain(
        ses,
        from,
        to,
        "Hoàn tiền bị từ chối / Refund rejected",
        body_text,
    )
    .await?;

    tracing::info!(to = to, booking_id, "Refund rejected email sent");
    Ok(())
}

pub async fn send_payout_sent(
    ses: &SesClient,
    from: &str,
    to: &str,
    booking_id: i64,
    amount: Decimal,
    bank_name: &str,
    account_number: &str,
) -> Result<(), BoxError> {
    let body_text = format!(
        "Khoản thanh toán cho đặt phòng #{booking_id} đã được chuyển.\n\
         Số tiền: {amount} VND đến {bank_name} ({account_number}).\n\n\
         The payout for booking #{booking_id} has been sent.\n\
         Amount: {amount} VND to {bank_name} ({account_number})."
    );

    send_plain(
        ses,
        from,
        to,
        "Đã chuyển tiền / Payout sent",
        body_text,
    )
    .await?;

    tracing::info!(to = to, booking_id, "Payout email sent");
    Ok(())
}

pub async fn send_payout_rejected(
    ses: &SesClient,
    from: &str,
    to: &str,
    booking_id: i64,
    reason: &str,
) -> Result<(), BoxError> {
    let body_text = format!(
        "Khoản thanh toán cho đặt phòng #{booking_id} đã bị tạm giữ.\n\
         Lý do: {reason}\n\
         Vui lòng liên hệ bộ phận hỗ trợ.\n\n\
         The payout for booking #{booking_id} has been withheld.\n\
         Reason: {reason}\n\
         Please contact support."
    );

    send_plain(
        ses,
        from,
        to,
        "Thanh toán bị tạm giữ / Payout withheld",
        body_text,
    )
    .await?;

    tracing::info!(to = to, booking_id, "Payout rejected email sent");
    Ok(())
}

/// Sent when a manual transfer bounced because of bad bank details. Does not
/// change any payment state.
pub async fn send_account_error(
    ses: &SesClient,
    from: &str,
    to: &str,
    booking_id: i64,
    message: &str,
) -> Result<(), BoxError> {
    let body_text = format!(
        "Không thể chuyển khoản cho đặt phòng #{booking_id}.\n\
         Chi tiết: {message}\n\
         Vui lòng kiểm tra lại thông tin tài khoản ngân hàng của bạn.\n\n\
         We could not transfer the payout for booking #{booking_id}.\n\
         Details: {message}\n\
         Please verify your bank account details."
    );

    send_plain(
        ses,
        from,
        to,
        "Lỗi tài khoản ngân hàng / Bank account problem",
        body_text,
    )
    .await?;

    tracing::info!(to = to, booking_id, "Account error email sent");
    Ok(())
}
