//! Full example code for driving an SSD1327 128x128 OLED module over I2C. This runs on an
//! STM32F303RE, with the module on I2C1 (PB6 SCL, PB7 SDA) at the default address 0x3C.

#![deny(unsafe_code)]
#![no_main]
#![no_std]

extern crate cortex_m;
extern crate stm32f30x;
extern crate stm32f30x_hal as hal;
#[macro_use]
extern crate cortex_m_rt;
extern crate panic_abort;
extern crate ssd1327;

use cortex_m::asm;
use cortex_m_rt::ExceptionFrame;
use hal::i2c::I2c;
use hal::prelude::*;
use ssd1327 as oled;

entry!(main);

exception!(*, default_handler);
exception!(HardFault, hard_fault);

fn hard_fault(_ef: &ExceptionFrame) -> ! {
    asm::bkpt();
    loop {}
}

fn default_handler(_irqn: i16) {
    loop {}
}

fn main() -> ! {
    // Get peripherals and set up RCC.
    let cp = cortex_m::Peripherals::take().unwrap();
    let dp = stm32f30x::Peripherals::take().unwrap();

    let mut flash = dp.FLASH.constrain();
    let mut rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze(&mut flash.acr);
    let mut delay = hal::delay::Delay::new(cp.SYST, clocks);

    // I2C1 is Alternate Function 4 for GPIOs PB6,7.
    let mut gpiob = dp.GPIOB.split(&mut rcc.ahb);
    let scl = gpiob.pb6.into_af4(&mut gpiob.moder, &mut gpiob.afrl);
    let sda = gpiob.pb7.into_af4(&mut gpiob.moder, &mut gpiob.afrl);

    // The HAL fixes the bus clock at construction, so the driver is told to leave it alone.
    let i2c = I2c::i2c1(dp.I2C1, (scl, sda), 400.khz(), clocks, &mut rcc.apb1);

    let mut disp = oled::Display::new(
        oled::I2cInterface::new(i2c, oled::DEFAULT_ADDRESS),
        oled::Geometry::SIZE_128X128,
        oled::Config::new(oled::RefreshMode::Delta).keep_clock_rate(),
    ).unwrap();

    // Give the panel's charge pump time to settle after power-up.
    delay.delay_ms(100_u16);

    disp.connect().unwrap();
    disp.init().unwrap();

    // Draw a frame around the edge of the panel. The first refresh sends every row.
    {
        let fb = disp.framebuffer_mut();
        for i in 0..128 {
            fb.set_pixel(i, 0, true);
            fb.set_pixel(i, 127, true);
            fb.set_pixel(0, i, true);
            fb.set_pixel(127, i, true);
        }
    }
    disp.refresh().unwrap();

    // Bounce a single pixel along the diagonal. Each refresh only sends the two changed rows.
    let mut pos = 1u8;
    loop {
        disp.framebuffer_mut().set_pixel(pos, pos, false);
        pos = if pos < 126 { pos + 1 } else { 1 };
        disp.framebuffer_mut().set_pixel(pos, pos, true);
        disp.refresh().unwrap();
        delay.delay_ms(20_u16);
    }
}
