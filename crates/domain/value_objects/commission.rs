use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::Serialize;

/// 7.5% added on top of the artist price, paid by the company.
pub const COMPANY_SHARE: Decimal = Decimal::from_parts(75, 0, 0, false, 3);
/// 7.5% withheld from the artist price.
pub const ARTIST_SHARE: Decimal = Decimal::from_parts(75, 0, 0, false, 3);
/// 2% of the artist price, paid to the referrer out of the platform margin.
pub const REFERRAL_RATE: Decimal = Decimal::from_parts(2, 0, 0, false, 2);

/// Full monetary breakdown of one booking, in major currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommissionBreakdown {
    pub artist_price: Decimal,
    pub company_fee: Decimal,
    pub artist_fee: Decimal,
    pub total_company_pays: Decimal,
    pub artist_receives: Decimal,
    pub platform_gross: Decimal,
    pub referral_commission: Decimal,
    pub platform_net: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommissionLabels {
    pub company: String,
    pub artist: String,
    pub platform: String,
}

/// The breakdown as stored on a booking, in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BookingFinancials {
    pub artist_price: i64,
    pub company_fee: i64,
    pub artist_fee: i64,
    pub total_company_pays: i64,
    pub artist_receives: i64,
    pub platform_gross: i64,
    pub referral_commission: i64,
    pub platform_net: i64,
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Computes the commission split for `base_price`.
///
/// Every step is rounded to cents (half away from zero) before it feeds the
/// next one, so the stored figures always add up exactly.
pub fn compute_breakdown(base_price: Decimal, referral_active: bool) -> CommissionBreakdown {
    let company_fee = round2(base_price * COMPANY_SHARE);
    let artist_fee = round2(base_price * ARTIST_SHARE);
    let total_company_pays = round2(base_price + company_fee);
    let artist_receives = round2(base_price - artist_fee);
    let platform_gross = round2(company_fee + artist_fee);
    let referral_commission = if referral_active {
        round2(base_price * REFERRAL_RATE)
    } else {
        Decimal::ZERO
    };
    let platform_net = round2(platform_gross - referral_commission);

    CommissionBreakdown {
        artist_price: base_price,
        company_fee,
        artist_fee,
        total_company_pays,
        artist_receives,
        platform_gross,
        referral_commission,
        platform_net,
    }
}

pub fn minor_to_major(amount_minor: i64) -> Decimal {
    Decimal::new(amount_minor, 2)
}

pub fn major_to_minor(amount: Decimal) -> Option<i64> {
    (round2(amount) * Decimal::ONE_HUNDRED).trunc().to_i64()
}

/// Formats an amount as `€1,075.00`.
pub fn format_eur(amount: Decimal) -> String {
    let rounded = round2(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let cents = (rounded.abs() * Decimal::ONE_HUNDRED)
        .trunc()
        .to_i128()
        .unwrap_or_default();

    let digits = (cents / 100).to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}€{grouped}.{:02}", cents % 100)
}

impl CommissionBreakdown {
    /// Breakdown without any referral share.
    pub fn for_price(base_price: Decimal) -> Self {
        compute_breakdown(base_price, false)
    }

    /// `None` only if an amount does not fit in `i64` minor units.
    pub fn to_minor_units(&self) -> Option<BookingFinancials> {
        Some(BookingFinancials {
            artist_price: major_to_minor(self.artist_price)?,
            company_fee: major_to_minor(self.company_fee)?,
            artist_fee: major_to_minor(self.artist_fee)?,
            total_company_pays: major_to_minor(self.total_company_pays)?,
            artist_receives: major_to_minor(self.artist_receives)?,
            platform_gross: major_to_minor(self.platform_gross)?,
            referral_commission: major_to_minor(self.referral_commission)?,
            platform_net: major_to_minor(self.platform_net)?,
        })
    }

    pub fn labels(&self) -> CommissionLabels {
        let platform = if self.referral_commission > Decimal::ZERO {
            format!(
                "Gross revenue {} − referral {} = {} net",
                format_eur(self.platform_gross),
                format_eur(self.referral_commission),
                format_eur(self.platform_net)
            )
        } else {
            format!("Gross revenue {}", format_eur(self.platform_gross))
        };

        CommissionLabels {
            company: format!(
                "Artist price {} + service fee {} = {}",
                format_eur(self.artist_price),
                format_eur(self.company_fee),
                format_eur(self.total_company_pays)
            ),
            artist: format!(
                "Price {} − commission {} = {} net",
                format_eur(self.artist_price),
                format_eur(self.artist_fee),
                format_eur(self.artist_receives)
            ),
            platform,
        }
    }
}

impl BookingFinancials {
    /// Computes the snapshot for an artist price given in minor units.
    pub fn compute(artist_price_minor: i64, referral_active: bool) -> Option<Self> {
        compute_breakdown(minor_to_major(artist_price_minor), referral_active).to_minor_units()
    }

    pub fn breakdown(&self) -> CommissionBreakdown {
        CommissionBreakdown {
            artist_price: minor_to_major(self.artist_price),
            company_fee: minor_to_major(self.company_fee),
            artist_fee: minor_to_major(self.artist_fee),
            total_company_pays: minor_to_major(self.total_company_pays),
            artist_receives: minor_to_major(self.artist_receives),
            platform_gross: minor_to_major(self.platform_gross),
            referral_commission: minor_to_major(self.referral_commission),
            platform_net: minor_to_major(self.platform_net),
        }
    }

    pub fn reconciles(&self) -> bool {
        self.total_company_pays == self.artist_price + self.company_fee
            && self.artist_receives == self.artist_price - self.artist_fee
            && self.platform_gross == self.company_fee + self.artist_fee
            && self.platform_net == self.platform_gross - self.referral_commission
    }
}
