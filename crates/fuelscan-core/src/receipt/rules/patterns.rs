//! Common regex patterns for fuel receipt extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Numbers with optional thousands/decimal separators: 10.5, 1,234.50, 10,5
    pub static ref NUMBER: Regex = Regex::new(
        r"\d+(?:[.,]\d+)*"
    ).unwrap();

    // Dates
    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b(\d{4})[./\-](\d{1,2})[./\-](\d{1,2})\b"
    ).unwrap();

    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{1,2})[./\-](\d{1,2})[./\-](\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref DATE_TEXT_MONTH: Regex = Regex::new(
        r"(?i)\b(\d{1,2})[\s\-]*(JAN|FEB|MAR|APR|MAY|JUN|JUL|AUG|SEP|OCT|NOV|DEC)[A-Z]*\.?[\s\-,]*(\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref DATE_LABEL: Regex = Regex::new(
        r"(?i)\b(?:DATE|DATED|DT)\b"
    ).unwrap();

    // Quantity: number directly followed by a volume unit
    pub static ref QUANTITY_WITH_UNIT: Regex = Regex::new(
        r"(?i)(\d+(?:[.,]\d+)*)\s*(LITRES|LITERS|LITRE|LITER|LTRS|LTR|LT|L|GALLONS|GALLON|GAL)\b"
    ).unwrap();

    // Quantity: number next to a QTY/VOL label
    pub static ref QUANTITY_LABELED: Regex = Regex::new(
        r"(?i)\b(?:QTY|QUANTITY|VOL|VOLUME)\b\.?[\s:=\-]*(\d+(?:[.,]\d+)*)"
    ).unwrap();

    // Price per unit: currency + number + per-unit qualifier, e.g. "$1.42/L", "Rs 95.50 per ltr"
    pub static ref PRICE_CURRENCY_PER_UNIT: Regex = Regex::new(
        r"(?i)(?:[$€£₹]|\bRS\.?|\bINR|\bUSD|\bEUR)\s*(\d+(?:[.,]\d+)*)\s*(?:/|PER\s+)(?:LITRES?|LITERS?|LTRS?|LT|L|GALLONS?|GAL)\b"
    ).unwrap();

    // Price per unit: number + per-unit qualifier without a currency
    pub static ref PRICE_PER_UNIT_SUFFIX: Regex = Regex::new(
        r"(?i)(\d+(?:[.,]\d+)*)\s*(?:/|PER\s+)(?:LITRES?|LITERS?|LTRS?|LT|L|GALLONS?|GAL)\b"
    ).unwrap();

    // Price per unit: RATE-style label + number
    pub static ref PRICE_LABELED: Regex = Regex::new(
        r"(?i)\b(?:RATE|UNIT\s+PRICE|PRICE\s*/\s*(?:L|LTR|LITRE|LITER|GAL)|PER\s+(?:LITRE|LITER|LTR))\b\.?[\s:=\-]*(?:[$€£₹]|RS\.?|INR)?\s*(\d+(?:[.,]\d+)*)"
    ).unwrap();

    // Station
    pub static ref STATION_LABELED: Regex = Regex::new(
        r"(?i)\b(?:STATION|SITE|OUTLET|DEALER|RETAILER|MERCHANT)(?:\s+NAME)?\s*[:\-]\s*(.+)$"
    ).unwrap();

    // Lines that are receipt boilerplate or field labels, never a station name
    pub static ref HEADER_KEYWORD: Regex = Regex::new(
        r"(?i)\b(?:RECEIPT|INVOICE|TAX|BILL|CASH|MEMO|WELCOME|THANK|THANKS|DATE|TIME|QTY|QUANTITY|VOL|VOLUME|RATE|PRICE|TOTAL|AMOUNT|AMT|PUMP|NOZZLE|TXN|TRANSACTION|GST|GSTIN|VAT|CUSTOMER|ORIGINAL|DUPLICATE|COPY|VEHICLE|MOBILE|PHONE|TEL|CARD|PAID|CHANGE|FUEL|PRODUCT)\b"
    ).unwrap();

    // Fuel grade keywords, grouped by how specific they are
    pub static ref GRADE_PREMIUM: Regex = Regex::new(
        r"(?i)\b(?:PREMIUM|XP\s?95|V-?POWER)\b"
    ).unwrap();

    pub static ref GRADE_DIESEL: Regex = Regex::new(
        r"(?i)\b(?:DIESEL|HSD)\b"
    ).unwrap();

    pub static ref GRADE_GENERIC: Regex = Regex::new(
        r"(?i)\b(?:SUPER|UNLEADED|PETROL|GASOLINE|REGULAR|MOTOR\s+SPIRIT)\b"
    ).unwrap();
}
